//! The top-level solve orchestration.

use log::{debug, info};
use sumlace_core::{ExtractError, Grid, SumVector, ValuePool, extract};

use crate::{
    assignment::Assignment,
    progress::{CancelToken, Difficulty, Phase, ProgressTracker},
    propagate::{propagate, total_solutions},
    search::run_search,
    trie::SolutionTrie,
    vector_state::build_vector_states,
};

/// Errors that abort a solve attempt before any search begins.
#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From,
)]
pub enum SolveError {
    /// The grid failed validation during vector extraction.
    #[display("invalid puzzle: {_0}")]
    Extract(ExtractError),
}

/// The result of a solve attempt.
///
/// Validation failures are reported separately as [`SolveError`] before the
/// engine starts; this trichotomy covers everything after that point.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum SolveOutcome {
    /// A complete, consistent assignment was found.
    Solved(Assignment),
    /// The search space was exhausted without finding an assignment.
    NoSolution,
    /// Cancellation was requested before a solution was found.
    Canceled,
}

/// A prepared solve attempt over one grid.
///
/// Construction extracts the vectors and value pool and surfaces validation
/// errors; [`run`](Self::run) executes generation, propagation, and the
/// parallel search.
///
/// # Examples
///
/// ```
/// use sumlace_core::Grid;
/// use sumlace_solver::{CancelToken, ProgressTracker, SolveOutcome, Solver};
///
/// let grid: Grid = "
///     R5 2 3 . . . . . . .
///     .  . D7 . . . . . . .
///     .  .  4 . . . . . . .
///     .  .  . . . . . . . .
///     .  .  . . . . . . . .
///     .  .  . . . . . . . .
///     .  .  . . . . . . . .
///     .  .  . . . . . . . .
///     .  .  . . . . . . . .
///     .  .  . . . . . . . .
/// "
/// .parse()?;
///
/// let cancel = CancelToken::new();
/// let progress = ProgressTracker::new();
/// let outcome = Solver::new(&grid)?
///     .with_cancel(cancel.clone())
///     .with_progress(progress.clone())
///     .run();
///
/// match outcome {
///     SolveOutcome::Solved(assignment) => {
///         assert_eq!(assignment.get(1), Some(2));
///         assert_eq!(assignment.get(2), Some(3));
///         assert_eq!(assignment.get(22), Some(4));
///     }
///     SolveOutcome::NoSolution | SolveOutcome::Canceled => unreachable!(),
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Solver {
    vectors: Vec<SumVector>,
    pool: ValuePool,
    cancel: CancelToken,
    progress: ProgressTracker,
    propagation: bool,
}

impl Solver {
    /// Extracts the grid's vectors and pool, validating every clue.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::Extract`] when a clue has no parsable numeric
    /// target.
    pub fn new(grid: &Grid) -> Result<Self, SolveError> {
        let progress = ProgressTracker::new();
        progress.set_phase(Phase::Extracting);
        let (vectors, pool) = extract(grid)?.into_parts();
        debug!(
            "extracted {} vectors over a pool of {} values",
            vectors.len(),
            pool.len()
        );
        Ok(Self {
            vectors,
            pool,
            cancel: CancelToken::new(),
            progress,
            propagation: true,
        })
    }

    /// Attaches a cancellation token shared with the caller.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Attaches a progress tracker shared with the caller.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressTracker) -> Self {
        self.progress = progress;
        self
    }

    /// Disables the propagation passes.
    ///
    /// The search stays correct without them, only slower.
    #[must_use]
    pub fn without_propagation(mut self) -> Self {
        self.propagation = false;
        self
    }

    /// Runs generation, propagation, and the search race to completion.
    #[must_use]
    pub fn run(self) -> SolveOutcome {
        let Self {
            vectors,
            pool,
            cancel,
            progress,
            propagation,
        } = self;

        progress.set_phase(Phase::Generating);
        let mut states = build_vector_states(&vectors, &pool);
        let lazy = states.iter().filter(|s| s.is_lazy()).count();
        if lazy > 0 {
            debug!("{lazy} vectors deferred to lazy population");
        }
        if cancel.is_canceled() {
            return SolveOutcome::Canceled;
        }

        if propagation {
            progress.set_phase(Phase::Propagating);
            propagate(&mut states, &pool);
            if cancel.is_canceled() {
                return SolveOutcome::Canceled;
            }
        }

        let total = total_solutions(&states);
        progress.set_total(total);
        info!(
            "search space holds {total} candidate orderings ({})",
            Difficulty::from_search_space(total)
        );

        if states
            .iter()
            .any(|s| s.trie().is_some_and(SolutionTrie::is_empty))
        {
            // Some vector has no viable ordering at all; nothing to search.
            return SolveOutcome::NoSolution;
        }

        progress.set_phase(Phase::Searching);
        let result = run_search(&states, &pool, &cancel, &progress);
        progress.set_phase(Phase::Idle);
        match result {
            Some(assignment) => SolveOutcome::Solved(assignment),
            None if cancel.is_canceled() => SolveOutcome::Canceled,
            None => SolveOutcome::NoSolution,
        }
    }
}
