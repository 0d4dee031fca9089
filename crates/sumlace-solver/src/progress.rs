//! Progress reporting, cancellation, and difficulty estimation.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering},
};

/// A cloneable handle for canceling a running solve.
///
/// All search tasks of one attempt share the token; once canceled, the
/// engine stops at the next frame transition and reports
/// [`SolveOutcome::Canceled`](crate::SolveOutcome::Canceled).
///
/// # Examples
///
/// ```
/// use sumlace_solver::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_canceled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-canceled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns `true` once cancellation has been requested.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// The engine's current phase, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[repr(u8)]
pub enum Phase {
    /// No solve is running.
    #[display("idle")]
    Idle = 0,
    /// Scanning the grid for vectors.
    #[display("extracting vectors")]
    Extracting = 1,
    /// Building per-vector solution tries.
    #[display("generating candidate orderings")]
    Generating = 2,
    /// Pruning the tries before search.
    #[display("propagating constraints")]
    Propagating = 3,
    /// Searching for a full assignment.
    #[display("searching")]
    Searching = 4,
}

impl Phase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Phase::Extracting,
            2 => Phase::Generating,
            3 => Phase::Propagating,
            4 => Phase::Searching,
            _ => Phase::Idle,
        }
    }
}

#[derive(Debug, Default)]
struct ProgressInner {
    completed: AtomicU64,
    total: AtomicU64,
    phase: AtomicU8,
}

/// A cloneable handle observing a running solve.
///
/// `completed` and `total` are implementation-defined units: the total is
/// the summed leaf count of all eagerly materialized tries after
/// propagation, and the completed count grows by one for every vector fully
/// placed along any search branch. The completed count only ever increases;
/// it is for display, never for control flow.
///
/// # Examples
///
/// ```
/// use sumlace_solver::{Phase, ProgressTracker};
///
/// let progress = ProgressTracker::new();
/// assert_eq!(progress.phase(), Phase::Idle);
/// assert_eq!(progress.completed(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    inner: Arc<ProgressInner>,
}

impl ProgressTracker {
    /// Creates a tracker in the idle state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the work completed so far.
    #[must_use]
    pub fn completed(&self) -> u64 {
        self.inner.completed.load(Ordering::Relaxed)
    }

    /// Returns the estimated total amount of work.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.inner.total.load(Ordering::Relaxed)
    }

    /// Returns the engine's current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.inner.phase.load(Ordering::Relaxed))
    }

    pub(crate) fn set_phase(&self, phase: Phase) {
        self.inner.phase.store(phase as u8, Ordering::Relaxed);
    }

    pub(crate) fn set_total(&self, total: u64) {
        self.inner.total.store(total, Ordering::Relaxed);
    }

    pub(crate) fn add_completed(&self, amount: u64) {
        self.inner.completed.fetch_add(amount, Ordering::Relaxed);
    }
}

/// A rough difficulty classification derived from the estimated search-space
/// size, for display next to the progress readout.
///
/// # Examples
///
/// ```
/// use sumlace_solver::Difficulty;
///
/// assert_eq!(Difficulty::from_search_space(1_000), Difficulty::Easy);
/// assert_eq!(Difficulty::from_search_space(600_000_000), Difficulty::Insane);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, derive_more::Display)]
pub enum Difficulty {
    /// Below 125 million candidate orderings.
    #[display("easy")]
    Easy,
    /// At least 125 million.
    #[display("medium")]
    Medium,
    /// At least 250 million.
    #[display("hard")]
    Hard,
    /// At least 325 million.
    #[display("harder")]
    Harder,
    /// At least 400 million.
    #[display("even harder")]
    EvenHarder,
    /// At least 500 million.
    #[display("insane")]
    Insane,
}

impl Difficulty {
    const MEDIUM: u64 = 125_000_000;
    const HARD: u64 = 250_000_000;
    const HARDER: u64 = 325_000_000;
    const EVEN_HARDER: u64 = 400_000_000;
    const INSANE: u64 = 500_000_000;

    /// Classifies an estimated search-space size.
    #[must_use]
    pub fn from_search_space(total: u64) -> Self {
        match total {
            t if t >= Self::INSANE => Difficulty::Insane,
            t if t >= Self::EVEN_HARDER => Difficulty::EvenHarder,
            t if t >= Self::HARDER => Difficulty::Harder,
            t if t >= Self::HARD => Difficulty::Hard,
            t if t >= Self::MEDIUM => Difficulty::Medium,
            _ => Difficulty::Easy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared_across_clones() {
        let token = CancelToken::new();
        assert!(!token.is_canceled());
        token.clone().cancel();
        assert!(token.is_canceled());
    }

    #[test]
    fn test_progress_counters() {
        let progress = ProgressTracker::new();
        progress.set_total(10);
        progress.add_completed(3);
        progress.add_completed(4);
        assert_eq!(progress.total(), 10);
        assert_eq!(progress.completed(), 7);

        let observer = progress.clone();
        assert_eq!(observer.completed(), 7);
    }

    #[test]
    fn test_phase_round_trip() {
        let progress = ProgressTracker::new();
        for phase in [
            Phase::Extracting,
            Phase::Generating,
            Phase::Propagating,
            Phase::Searching,
            Phase::Idle,
        ] {
            progress.set_phase(phase);
            assert_eq!(progress.phase(), phase);
        }
    }

    #[test]
    fn test_phase_labels() {
        assert_eq!(Phase::Searching.to_string(), "searching");
        assert_eq!(Phase::Generating.to_string(), "generating candidate orderings");
    }

    #[test]
    fn test_difficulty_thresholds() {
        assert_eq!(Difficulty::from_search_space(0), Difficulty::Easy);
        assert_eq!(
            Difficulty::from_search_space(125_000_000),
            Difficulty::Medium
        );
        assert_eq!(Difficulty::from_search_space(250_000_000), Difficulty::Hard);
        assert_eq!(
            Difficulty::from_search_space(325_000_000),
            Difficulty::Harder
        );
        assert_eq!(
            Difficulty::from_search_space(400_000_000),
            Difficulty::EvenHarder
        );
        assert_eq!(
            Difficulty::from_search_space(499_999_999),
            Difficulty::EvenHarder
        );
        assert_eq!(
            Difficulty::from_search_space(500_000_000),
            Difficulty::Insane
        );
    }
}
