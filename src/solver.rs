use crate::{
    matrix::{ConstructionError, Matrix, NodeId},
    ExactCover,
};
use log::{debug, trace};
use std::collections::{BTreeSet, VecDeque};

/// A single exact cover: the set of indices of the selected rows.
///
/// A row can never be selected twice along one search path, so a set loses
/// no information; `BTreeSet` keeps its iteration order deterministic.
pub type Solution = BTreeSet<usize>;

/// Solver that iteratively returns solutions to exact cover problems.
///
/// The depth-first search runs on an explicit stack of [`Frame`]s instead of
/// the call stack, so the deepest solution path is bounded by available
/// memory rather than by any recursion limit. Solutions come out lazily, one
/// per call to [`Solver::next_solution`], in a traversal order that is
/// reproducible bit-for-bit for identical input.
#[derive(Debug)]
pub struct Solver {
    matrix: Matrix,

    // Values used to track the state of solving
    partial_solution: Vec<usize>,
    stack: Vec<Frame>,
    // Set when the matrix had no columns to begin with, in which case the
    // empty selection is the single solution and there is nothing to search.
    trivially_solved: bool,
}

#[derive(Debug)]
enum FrameState {
    // Before covering the row of the frame's front candidate
    Cover,
    // After recursing below the covered row, before uncovering it
    Uncover,
}

#[derive(Debug)]
struct Frame {
    // Nodes of the rows intersecting the chosen column, top-to-bottom. The
    // front candidate is the one currently covered while in `Uncover` state.
    candidates: VecDeque<NodeId>,
    state: FrameState,
}

impl Solver {
    /// Create a new `Solver` over the given matrix.
    pub fn new(matrix: Matrix) -> Self {
        let mut solver = Self {
            matrix,

            partial_solution: Vec::new(),
            stack: Vec::new(),
            trivially_solved: false,
        };
        solver.push_first_frame();

        solver
    }

    /// Build the matrix for `(num_columns, subsets)` and create a `Solver`
    /// over it.
    pub fn from_subsets(
        num_columns: usize,
        subsets: &[Vec<usize>],
    ) -> Result<Self, ConstructionError> {
        Ok(Self::new(Matrix::new(num_columns, subsets)?))
    }

    /// Rewind any search in progress and start over from the root, leaving
    /// the matrix in its pristine state.
    pub fn reset(&mut self) {
        while let Some(frame) = self.stack.pop() {
            if let FrameState::Uncover = frame.state {
                // The front candidate's row is still covered; undo it.
                self.matrix.uncover(*frame.candidates.front().unwrap());
                self.partial_solution.pop();
            }
        }

        self.trivially_solved = false;
        self.push_first_frame();
    }

    /// Read-only view of the matrix being searched.
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    fn push_first_frame(&mut self) {
        if self.matrix.is_solved() {
            self.trivially_solved = true;
        } else if let Some(candidates) = Self::choose_candidates(&self.matrix) {
            self.stack.push(Frame {
                state: FrameState::Cover,
                candidates,
            });
        }
    }

    /// Select the column to branch on and list the rows that could cover it.
    ///
    /// This implementation chooses the column with the fewest remaining rows
    /// to keep the branching factor low, breaking ties in favor of the first
    /// minimal column scanning left-to-right from the root. Returns `None`
    /// if some column has no remaining rows at all: no row can ever cover
    /// it, so the current branch contains no solutions.
    fn choose_candidates(matrix: &Matrix) -> Option<VecDeque<NodeId>> {
        let mut min: Option<(NodeId, usize)> = None;

        for header in matrix.uncovered_columns() {
            let size = matrix.column_size(header).unwrap();

            if size == 0 {
                trace!(
                    "element {} has no remaining candidate rows; abandoning branch",
                    matrix.column_index(header).unwrap()
                );
                return None;
            }

            match min {
                Some((_, min_size)) if size >= min_size => {}
                _ => min = Some((header, size)),
            }
        }

        min.map(|(header, size)| {
            trace!(
                "branching on element {} with {} candidate rows",
                matrix.column_index(header).unwrap(),
                size
            );
            matrix.uncovered_rows_in_column(header).collect()
        })
    }

    /// Return all remaining solutions.
    pub fn all_solutions(&mut self) -> Vec<Solution> {
        self.collect()
    }

    /// Compute up to the next solution, returning `None` if there are no
    /// more.
    pub fn next_solution(&mut self) -> Option<Solution> {
        if self.trivially_solved {
            self.trivially_solved = false;
            debug!("matrix has no columns; the empty selection is the only cover");
            return Some(Solution::new());
        }

        enum StackOp<T> {
            Push(T),
            Pop,
            None,
        }

        while !self.stack.is_empty() {
            let curr_frame = self.stack.last_mut().unwrap();

            let (stack_op, possible_solution) = match curr_frame.state {
                // Commit to the row of the front candidate and add it to the
                // partial solution.
                FrameState::Cover => {
                    let node = *curr_frame.candidates.front().unwrap();
                    curr_frame.state = FrameState::Uncover;

                    let row = self.matrix.row_index(node).unwrap();
                    self.matrix.cover(node);
                    self.partial_solution.push(row);

                    // This is where the recursion happens, but we also have
                    // to check for a completed cover here.
                    if self.matrix.is_solved() {
                        let solution: Solution = self.partial_solution.iter().copied().collect();
                        (StackOp::None, Some(solution))
                    } else if let Some(candidates) = Self::choose_candidates(&self.matrix) {
                        (
                            StackOp::Push(Frame {
                                state: FrameState::Cover,
                                candidates,
                            }),
                            None,
                        )
                    } else {
                        (StackOp::None, None)
                    }
                }
                // Withdraw the front candidate's row, remove it from the
                // partial solution, and move on to the next candidate.
                FrameState::Uncover => {
                    let node = curr_frame.candidates.pop_front().unwrap();

                    self.matrix.uncover(node);
                    self.partial_solution.pop();

                    if curr_frame.candidates.is_empty() {
                        (StackOp::Pop, None)
                    } else {
                        curr_frame.state = FrameState::Cover;
                        (StackOp::None, None)
                    }
                }
            };

            match stack_op {
                StackOp::Push(val) => {
                    self.stack.push(val);
                }
                StackOp::Pop => {
                    self.stack.pop();
                }
                StackOp::None => {}
            }

            if let Some(solution) = possible_solution {
                debug!(
                    "found cover of {} rows at depth {}",
                    solution.len(),
                    self.stack.len()
                );
                return Some(solution);
            }
        }

        None
    }
}

impl Iterator for Solver {
    type Item = Solution;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_solution()
    }
}

/// Solver for problems described through the [`ExactCover`] trait.
///
/// Lowers the problem's possibilities and constraints into the integer
/// `(num_columns, subsets)` form the core [`Solver`] works on, and maps each
/// solution back to references into the problem's possibility list.
#[derive(Debug)]
pub struct ProblemSolver<'e, E: ExactCover> {
    problem: &'e E,
    inner: Solver,
}

impl<'e, E> ProblemSolver<'e, E>
where
    E: ExactCover,
{
    /// Create a new `ProblemSolver` with the given instance of an exact
    /// cover problem.
    pub fn new(problem: &'e E) -> Self {
        let constraints = problem.constraints();

        // One subset per possibility, listing the constraints it satisfies
        // in constraint-list order. Every element is in range by
        // construction, so validation is unnecessary here.
        let subsets: Vec<Vec<usize>> = problem
            .possibilities()
            .iter()
            .map(|poss| {
                constraints
                    .iter()
                    .enumerate()
                    .filter(|(_, cons)| problem.satisfies(poss, cons))
                    .map(|(column, _)| column)
                    .collect()
            })
            .collect();

        Self {
            problem,
            inner: Solver::new(Matrix::build(constraints.len(), &subsets)),
        }
    }

    /// Rewind any search in progress and start over from the root.
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Return all remaining solutions.
    pub fn all_solutions(&mut self) -> Vec<Vec<&'e E::Possibility>> {
        self.collect()
    }

    /// Compute up to the next solution, returning `None` if there are no
    /// more.
    pub fn next_solution(&mut self) -> Option<Vec<&'e E::Possibility>> {
        let rows = self.inner.next_solution()?;

        Some(
            rows.into_iter()
                .map(|row| &self.problem.possibilities()[row])
                .collect(),
        )
    }
}

impl<'e, E> Iterator for ProblemSolver<'e, E>
where
    E: ExactCover,
{
    type Item = Vec<&'e E::Possibility>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_solution()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(num_columns: usize, subsets: &[Vec<usize>]) -> Vec<Solution> {
        Solver::from_subsets(num_columns, subsets)
            .unwrap()
            .all_solutions()
    }

    fn set(rows: &[usize]) -> Solution {
        rows.iter().copied().collect()
    }

    #[test]
    fn unique_cover() {
        let solutions = solve(
            5,
            &[
                vec![0, 2],
                vec![0, 3, 4],
                vec![1, 3],
                vec![1, 4],
                vec![2, 3],
                vec![4],
            ],
        );

        assert_eq!(solutions, vec![set(&[0, 2, 5])]);
    }

    #[test]
    fn multiple_covers_in_traversal_order() {
        let solutions = solve(3, &[vec![0], vec![1], vec![0, 1], vec![2]]);

        assert_eq!(solutions, vec![set(&[0, 1, 3]), set(&[2, 3])]);
    }

    #[test]
    fn duplicate_subsets_each_form_a_cover() {
        let solutions = solve(1, &[vec![0], vec![0], vec![0]]);

        assert_eq!(solutions, vec![set(&[0]), set(&[1]), set(&[2])]);
    }

    #[test]
    fn empty_universe_has_the_empty_cover() {
        let solutions = solve(0, &[]);

        assert_eq!(solutions, vec![Solution::new()]);
    }

    #[test]
    fn uncoverable_element_yields_no_solutions() {
        let solutions = solve(2, &[vec![0]]);

        assert_eq!(solutions, Vec::<Solution>::new());
    }

    #[test]
    fn knuth_paper_example() {
        let solutions = solve(
            7,
            &[
                vec![2, 4, 5],
                vec![0, 3, 6],
                vec![1, 2, 5],
                vec![0, 3],
                vec![1, 6],
                vec![3, 4, 6],
            ],
        );

        assert_eq!(solutions, vec![set(&[0, 3, 4])]);
    }

    #[test]
    fn empty_subsets_are_excluded_from_solutions() {
        let solutions = solve(1, &[vec![], vec![0]]);

        assert_eq!(solutions, vec![set(&[1])]);
    }

    #[test]
    fn traversal_order_is_deterministic() {
        let subsets = vec![vec![0], vec![1], vec![0, 1], vec![2], vec![2]];

        let first = solve(3, &subsets);
        let second = solve(3, &subsets);
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn reset_restarts_an_exhausted_search() {
        let mut solver = Solver::from_subsets(3, &[vec![0], vec![1], vec![0, 1], vec![2]]).unwrap();

        let first = solver.all_solutions();
        assert_eq!(solver.next_solution(), None);

        solver.reset();
        assert_eq!(solver.all_solutions(), first);
    }

    #[test]
    fn reset_rewinds_a_search_in_progress() {
        let mut solver = Solver::from_subsets(3, &[vec![0], vec![1], vec![0, 1], vec![2]]).unwrap();

        assert_eq!(solver.next_solution(), Some(set(&[0, 1, 3])));

        solver.reset();
        assert_eq!(
            solver.all_solutions(),
            vec![set(&[0, 1, 3]), set(&[2, 3])]
        );
    }

    #[test]
    fn reset_restores_the_trivial_solution() {
        let mut solver = Solver::from_subsets(0, &[]).unwrap();

        assert_eq!(solver.next_solution(), Some(Solution::new()));
        assert_eq!(solver.next_solution(), None);

        solver.reset();
        assert_eq!(solver.next_solution(), Some(Solution::new()));
    }

    #[test]
    fn exhausted_search_leaves_the_matrix_pristine() {
        let subsets = vec![
            vec![0, 2],
            vec![0, 3, 4],
            vec![1, 3],
            vec![1, 4],
            vec![2, 3],
            vec![4],
        ];
        let mut solver = Solver::from_subsets(5, &subsets).unwrap();

        solver.all_solutions();

        let pristine = Matrix::new(5, &subsets).unwrap();
        assert_eq!(solver.matrix().to_string(), pristine.to_string());
    }

    #[test]
    fn solver_is_an_iterator() {
        let solver = Solver::from_subsets(1, &[vec![0], vec![0], vec![0]]).unwrap();

        assert_eq!(solver.count(), 3);
    }
}
