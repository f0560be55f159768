#![deny(missing_docs)]

//! Implementation of [Dancing Links](https://en.wikipedia.org/wiki/Dancing_Links)
//! and [Algorithm X](https://en.wikipedia.org/wiki/Knuth%27s_Algorithm_X) for solving
//! [exact cover](https://en.wikipedia.org/wiki/Exact_cover) problems.
//!
//! The [`Matrix`] holds the toroidal doubly-linked mesh from Knuth's paper
//! and exposes [`cover`](Matrix::cover)/[`uncover`](Matrix::uncover) as its
//! only mutating operations. The [`Solver`] drives a depth-first search over
//! that mesh and yields every exact cover as a set of row indices:
//!
//! ```
//! use algorithm_x::Solver;
//!
//! let subsets = vec![vec![0], vec![1], vec![0, 1], vec![2]];
//! let solutions = Solver::from_subsets(3, &subsets).unwrap().all_solutions();
//!
//! assert_eq!(solutions.len(), 2);
//! assert_eq!(solutions[0], [0, 1, 3].into_iter().collect());
//! assert_eq!(solutions[1], [2, 3].into_iter().collect());
//! ```
//!
//! Problems that are more naturally described in their own vocabulary than
//! as integer subsets can implement [`ExactCover`] and use the
//! [`ProblemSolver`] returned by [`ExactCover::solver`] instead.

pub mod matrix;
pub(crate) mod solver;

pub use matrix::{ConstructionError, Matrix, NodeId};
pub use solver::{ProblemSolver, Solution, Solver};

/// An instance of an exact cover problem.
pub trait ExactCover {
    /// The type of values that are elements of a solution to the exact cover
    /// problem.
    type Possibility: core::fmt::Debug;

    /// The type of value that are constraints on a given instance of an exact
    /// cover problem.
    type Constraint: core::fmt::Debug;

    /// Return true if the given `Possibility` will satisfy the given
    /// `Constraint`.
    fn satisfies(&self, poss: &Self::Possibility, cons: &Self::Constraint) -> bool;

    /// Return a list of possibilities for this instance of the problem.
    fn possibilities(&self) -> &[Self::Possibility];

    /// Return a list of constraints that must be satisfied for this instance of
    /// the problem.
    fn constraints(&self) -> &[Self::Constraint];

    /// Return an iterator over all solutions to this instance of the exact
    /// cover problem.
    fn solver(&self) -> ProblemSolver<Self>
    where
        Self: Sized,
    {
        ProblemSolver::new(self)
    }
}

impl<E> ExactCover for &E
where
    E: ExactCover,
{
    type Constraint = E::Constraint;
    type Possibility = E::Possibility;

    fn satisfies(&self, poss: &Self::Possibility, cons: &Self::Constraint) -> bool {
        <E as ExactCover>::satisfies(self, poss, cons)
    }

    fn possibilities(&self) -> &[Self::Possibility] {
        <E as ExactCover>::possibilities(self)
    }

    fn constraints(&self) -> &[Self::Constraint] {
        <E as ExactCover>::constraints(self)
    }
}
