use std::path::PathBuf;
use std::time::Duration;

use crate::error::CrossCheckError;

/// The outcome of a completed run.
///
/// The report file on disk is the run's primary output; this summary is for
/// callers that want the numbers without parsing it.
pub struct RunSummary {
    /// Archives handed to the dispatcher.
    pub archives: usize,

    /// Tasks submitted, one per batch.
    pub batches: usize,

    /// Worker threads actually spawned, at most one per batch.
    pub workers: usize,

    /// Archives with at least one matching line that were extracted.
    pub matched: usize,

    /// Archives with no matching line. Each has one line in the report.
    pub unmatched: usize,

    /// Archives skipped because scanning or extraction failed.
    pub failed: usize,

    /// Files written to the output directory, in completion order.
    pub extracted: Vec<PathBuf>,

    /// The per-archive errors behind `failed`. These never reach the report.
    pub errors: Vec<CrossCheckError>,

    /// Wall-clock time from dispatch to report flush.
    pub duration: Duration,
}

impl RunSummary {
    /// Archives that reached a verdict and were fully handled.
    pub fn processed(&self) -> usize {
        self.matched + self.unmatched
    }
}
