//! Sweep progress reporting.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

use photosweep_core::SweepWarning;
use tokio::sync::broadcast;
use tracing::warn;

/// Stage of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepPhase {
    /// Sweep accepted, nothing processed yet.
    Starting,
    /// Computing signatures in chunks.
    Signatures,
    /// Building the duplicate index.
    Grouping,
    /// Categorizing photos.
    Categorizing,
    /// All photos categorized.
    Complete,
}

impl fmt::Display for SweepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => write!(f, "Starting"),
            Self::Signatures => write!(f, "Computing signatures"),
            Self::Grouping => write!(f, "Grouping duplicates"),
            Self::Categorizing => write!(f, "Categorizing"),
            Self::Complete => write!(f, "Complete"),
        }
    }
}

/// Progress information during a sweep.
#[derive(Debug, Clone)]
pub struct SweepProgress {
    /// Current phase.
    pub phase: SweepPhase,
    /// Overall completion, 0 to 100, never decreasing within a sweep.
    pub percent: u8,
    /// Photos processed in the current phase.
    pub processed: u64,
    /// Photos in the sweep.
    pub total: u64,
    /// Time elapsed since the sweep started.
    pub elapsed: Duration,
}

impl SweepProgress {
    /// Check if this is the final update of a sweep.
    pub fn is_complete(&self) -> bool {
        self.phase == SweepPhase::Complete
    }
}

/// Percent bands of the overall progress range.
pub(crate) const STARTING_PERCENT: u8 = 5;
pub(crate) const GROUPING_PERCENT: u8 = 50;
pub(crate) const CATEGORIZE_END_PERCENT: u8 = 95;
pub(crate) const COMPLETE_PERCENT: u8 = 100;

/// Map `done` of `total` into the band `[from, to]`.
pub(crate) fn band(from: u8, to: u8, done: usize, total: usize) -> u8 {
    if total == 0 {
        return to;
    }
    let span = u64::from(to.saturating_sub(from));
    let offset = span * done.min(total) as u64 / total as u64;
    from + offset as u8
}

/// Delivers monotonic progress to a callback and to broadcast subscribers.
///
/// A panicking callback is contained: the sweep continues and a single
/// warning is recorded.
pub(crate) struct ProgressReporter<'a, F> {
    on_progress: F,
    tx: &'a broadcast::Sender<SweepProgress>,
    start: Instant,
    last_percent: u8,
    callback_panicked: bool,
    warnings: Vec<SweepWarning>,
}

impl<'a, F> ProgressReporter<'a, F>
where
    F: FnMut(u8),
{
    pub fn new(on_progress: F, tx: &'a broadcast::Sender<SweepProgress>) -> Self {
        Self {
            on_progress,
            tx,
            start: Instant::now(),
            last_percent: 0,
            callback_panicked: false,
            warnings: Vec::new(),
        }
    }

    pub fn report(&mut self, phase: SweepPhase, percent: u8, processed: usize, total: usize) {
        let percent = percent.clamp(self.last_percent, COMPLETE_PERCENT);
        self.last_percent = percent;

        let on_progress = &mut self.on_progress;
        if catch_unwind(AssertUnwindSafe(|| on_progress(percent))).is_err()
            && !self.callback_panicked
        {
            warn!(target: "photosweep::progress", percent, "progress callback panicked");
            self.callback_panicked = true;
            self.warnings.push(SweepWarning::progress_panicked(percent));
        }

        // No subscribers is fine
        let _ = self.tx.send(SweepProgress {
            phase,
            percent,
            processed: processed as u64,
            total: total as u64,
            elapsed: self.start.elapsed(),
        });
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn into_warnings(self) -> Vec<SweepWarning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band() {
        assert_eq!(band(5, 50, 0, 200), 5);
        assert_eq!(band(5, 50, 50, 200), 16);
        assert_eq!(band(5, 50, 200, 200), 50);
        assert_eq!(band(50, 95, 25, 100), 61);
        assert_eq!(band(50, 95, 100, 100), 95);
        assert_eq!(band(50, 95, 0, 0), 95);
    }

    #[test]
    fn test_reporter_is_monotonic() {
        let (tx, _) = broadcast::channel(16);
        let mut seen = Vec::new();
        let mut reporter = ProgressReporter::new(|p| seen.push(p), &tx);

        reporter.report(SweepPhase::Signatures, 30, 1, 2);
        reporter.report(SweepPhase::Signatures, 20, 1, 2);
        reporter.report(SweepPhase::Complete, 120, 2, 2);
        drop(reporter);

        assert_eq!(seen, vec![30, 30, 100]);
    }

    #[test]
    fn test_reporter_contains_callback_panics() {
        let (tx, mut rx) = broadcast::channel(16);
        let mut reporter = ProgressReporter::new(|_| panic!("observer failed"), &tx);

        reporter.report(SweepPhase::Starting, 5, 0, 1);
        reporter.report(SweepPhase::Complete, 100, 1, 1);

        let warnings = reporter.into_warnings();
        assert_eq!(warnings.len(), 1);

        // Subscribers still get every update
        assert_eq!(rx.try_recv().unwrap().percent, 5);
        assert!(rx.try_recv().unwrap().is_complete());
    }
}
