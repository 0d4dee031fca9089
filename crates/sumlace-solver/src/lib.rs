//! Constraint-generation, propagation, and backtracking search for
//! sum-vector grid puzzles.
//!
//! The engine takes a [`Grid`](sumlace_core::Grid), extracts its sum vectors
//! and value pool, and searches for one assignment of pool values to cells
//! under which every vector sums to its target.
//!
//! # Pipeline
//!
//! 1. **Generation** — for every vector, enumerate the pool combinations
//!    matching its length and target, expand them into distinct orderings,
//!    and store the result in a per-vector [`SolutionTrie`]. Vectors whose
//!    eager expansion would be too large are kept lazy and regenerated
//!    against the live pool during search.
//! 2. **Propagation** — prune the tries with two fixpoint passes: singles
//!    (pool values with one occurrence are claimed by at most one vector)
//!    and intersections (arc-consistency between vectors sharing a cell).
//! 3. **Search** — two heuristic vector orderings race over worker threads;
//!    each explores the tries depth-first with copy-on-branch state, and the
//!    first complete assignment wins and cancels the rest.
//!
//! # Examples
//!
//! ```
//! use sumlace_core::Grid;
//! use sumlace_solver::{SolveOutcome, Solver};
//!
//! let grid: Grid = "
//!     R5 2 3 . . . . . . .
//!     .  . D7 . . . . . . .
//!     .  .  4 . . . . . . .
//!     .  .  . . . . . . . .
//!     .  .  . . . . . . . .
//!     .  .  . . . . . . . .
//!     .  .  . . . . . . . .
//!     .  .  . . . . . . . .
//!     .  .  . . . . . . . .
//!     .  .  . . . . . . . .
//! "
//! .parse()?;
//!
//! let outcome = Solver::new(&grid)?.run();
//! assert!(outcome.is_solved());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use self::{
    assignment::Assignment,
    progress::{CancelToken, Difficulty, Phase, ProgressTracker},
    solver::{SolveError, SolveOutcome, Solver},
    trie::{SolutionTrie, TrieCursor},
};

mod assignment;
mod combination;
mod expand;
mod progress;
mod propagate;
mod search;
mod solver;
mod trie;
mod vector_state;
