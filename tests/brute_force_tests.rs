//! Cross-checks the solver against a direct enumeration of every selection
//! of rows, over every possible four-element instance. Since the direct
//! enumeration has no pruning at all, agreement here also witnesses that
//! the solver's dead-column pruning never changes the set of solutions.

use algorithm_x::{Solution, Solver};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::collections::BTreeSet;

/// Solve a single four-element instance, with `seed` packing four rows of
/// four membership bits each, and compare against brute force.
fn check_seed(seed: u16) {
    let subsets: Vec<Vec<usize>> = (0..4)
        .map(|row| {
            let bits = (seed >> (row * 4)) & 0b1111;
            (0..4).filter(|&element| bits & (1 << element) != 0).collect()
        })
        .collect();

    // Try every selection of rows directly. A selection is an exact cover
    // when its subsets' sizes sum to the size of their union and that union
    // is the whole universe. Selections touching an empty subset are
    // excluded up front, matching the contract that empty rows are never
    // selectable.
    let mut expected = BTreeSet::new();
    for mask in 0u32..16 {
        let selected: Vec<usize> = (0..4).filter(|&row| mask & (1 << row) != 0).collect();

        if selected.iter().any(|&row| subsets[row].is_empty()) {
            continue;
        }

        let total: usize = selected.iter().map(|&row| subsets[row].len()).sum();
        let union: BTreeSet<usize> = selected
            .iter()
            .flat_map(|&row| subsets[row].iter().copied())
            .collect();

        if union.len() == 4 && total == 4 {
            expected.insert(selected.into_iter().collect::<Solution>());
        }
    }

    let all: Vec<Solution> = Solver::from_subsets(4, &subsets).unwrap().collect();
    let found: BTreeSet<Solution> = all.iter().cloned().collect();

    assert_eq!(
        all.len(),
        found.len(),
        "no cover may be reported twice for instance {:#06x}",
        seed
    );
    assert_eq!(found, expected, "instance {:#06x} ({:?})", seed, subsets);
}

#[test]
fn matches_brute_force_on_all_four_element_instances() {
    (0u32..=u32::from(u16::MAX))
        .into_par_iter()
        .for_each(|seed| check_seed(seed as u16));
}
