use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::archive::ArchiveHandle;
use crate::barrier::{CompletionBarrier, DEFAULT_PROGRESS_INTERVAL};
use crate::dispatch::DEFAULT_BATCH_SIZE;
use crate::engine::{run, EngineOptions, PoolConfig};
use crate::error::CrossCheckError;
use crate::report::DEFAULT_REPORT_FILE;
use crate::results::RunSummary;
use crate::source::check_folder;
use crate::tokens::TokenSet;
use crate::traits::Source;

/// Workers per unit of batch size when `.workers()` is not set.
pub const WORKERS_PER_BATCH_SLOT: usize = 20;

// ---------------------------------------------------------------------------
// CrossCheckBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a cross-check run.
///
/// Created via [`crosscheck::crosscheck()`](crate::crosscheck). Configure
/// with chained builder methods, then call [`run()`](CrossCheckBuilder::run).
///
/// # Example
///
/// ```rust,no_run
/// use crosscheck::{DirectorySource, TokenSet};
///
/// let summary = crosscheck::crosscheck()
///     .tokens(TokenSet::load("search/strings.txt")?)
///     .source(DirectorySource::new("zips"))
///     .output_dir("out")
///     .batch_size(4)
///     .run()?;
///
/// println!("{} extracted, {} missed", summary.matched, summary.unmatched);
/// # Ok::<(), crosscheck::CrossCheckError>(())
/// ```
pub struct CrossCheckBuilder {
    tokens:            Option<Arc<TokenSet>>,
    source:            Option<Box<dyn Source>>,
    output_dir:        Option<PathBuf>,
    report_path:       PathBuf,
    batch_size:        usize,
    workers:           Option<usize>,
    queue_capacity:    Option<usize>,
    deadline:          Option<Duration>,
    progress_interval: Duration,
}

impl Default for CrossCheckBuilder {
    fn default() -> Self {
        Self {
            tokens:            None,
            source:            None,
            output_dir:        None,
            report_path:       PathBuf::from(DEFAULT_REPORT_FILE),
            batch_size:        DEFAULT_BATCH_SIZE,
            workers:           None,
            queue_capacity:    None,
            deadline:          None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl CrossCheckBuilder {
    // ── Inputs ────────────────────────────────────────────────────────────

    /// The search strings to test archive lines against.
    pub fn tokens(mut self, tokens: impl Into<Arc<TokenSet>>) -> Self {
        self.tokens = Some(tokens.into());
        self
    }

    /// Where the archives come from.
    pub fn source(mut self, s: impl Source + 'static) -> Self {
        self.source = Some(Box::new(s));
        self
    }

    /// Shorthand for an explicit list of archive paths, checked in order.
    pub fn archives<I, P>(self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let handles: Vec<ArchiveHandle> = paths
            .into_iter()
            .map(ArchiveHandle::new)
            .collect();
        self.source(handles)
    }

    /// Directory receiving extracted files. Must already exist.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Where the missed-archive report is written.
    ///
    /// Defaults to `missed_zips.txt` in the working directory.
    pub fn report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = path.into();
        self
    }

    // ── Pool ──────────────────────────────────────────────────────────────

    /// Archives per task. Defaults to 2.
    pub fn batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    /// Worker thread count. Defaults to 20 times the batch size.
    ///
    /// Never more threads are spawned than there are batches to run.
    pub fn workers(mut self, n: usize) -> Self {
        self.workers = Some(n);
        self
    }

    /// Tasks that may wait in the queue before submission blocks.
    /// Defaults to the worker count.
    pub fn queue_capacity(mut self, n: usize) -> Self {
        self.queue_capacity = Some(n);
        self
    }

    // ── Completion ────────────────────────────────────────────────────────

    /// Stop waiting for tasks after `d` and fail with
    /// [`CrossCheckError::Timeout`]. No deadline by default.
    pub fn deadline(mut self, d: Duration) -> Self {
        self.deadline = Some(d);
        self
    }

    /// How often to log progress while waiting for tasks. Defaults to 1s.
    pub fn progress_interval(mut self, d: Duration) -> Self {
        self.progress_interval = d;
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Execute the run and return its summary.
    ///
    /// Blocks until every task has finished (or the deadline passes) and the
    /// report has been written.
    ///
    /// # Errors
    ///
    /// Returns `Err` for configuration errors (missing inputs, output
    /// directory missing, zero batch size or workers), for a failing source,
    /// for a missed deadline and for a report that cannot be written.
    /// Per-archive failures are not errors here; they are counted in
    /// [`RunSummary::failed`].
    pub fn run(self) -> Result<RunSummary, CrossCheckError> {
        let tokens = self.tokens.ok_or(CrossCheckError::MissingInput("token set"))?;
        let source = self.source.ok_or(CrossCheckError::MissingInput("archive source"))?;
        let output_dir = self
            .output_dir
            .ok_or(CrossCheckError::MissingInput("output directory"))?;
        check_folder(&output_dir)?;

        if self.batch_size == 0 {
            return Err(CrossCheckError::InvalidBatchSize(self.batch_size));
        }
        let workers = self
            .workers
            .unwrap_or(self.batch_size.saturating_mul(WORKERS_PER_BATCH_SLOT));
        if workers == 0 {
            return Err(CrossCheckError::InvalidWorkerCount(workers));
        }

        let opts = EngineOptions {
            config: PoolConfig {
                batch_size:     self.batch_size,
                workers,
                queue_capacity: self.queue_capacity.unwrap_or(workers),
            },
            tokens,
            archives: source.archives()?,
            output_dir,
            report_path: self.report_path,
            barrier: CompletionBarrier::new()
                .progress_interval(self.progress_interval)
                .deadline(self.deadline),
        };

        run(opts)
    }
}
