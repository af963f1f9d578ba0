//! # crosscheck
//!
//! Parallel cross-checking of single-entry zip archives against a set of
//! search strings.
//!
//! Every line of every archive's entry is tested for exact membership in a
//! [`TokenSet`]. Archives with a hit are extracted to an output directory;
//! archives without one get a line in the missed report. Archives are split
//! into fixed-size batches and each batch runs as one task on a fixed worker
//! pool. The report is written once, after every task has completed.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use crosscheck::{DirectorySource, TokenSet};
//!
//! let summary = crosscheck::crosscheck()
//!     .tokens(TokenSet::from_lines(["alpha", "beta"]))
//!     .source(DirectorySource::new("zips"))
//!     .output_dir("out")
//!     .report_path("out/missed_zips.txt")
//!     .run()?;
//!
//! println!(
//!     "{} matched, {} missed, {} failed in {:.3}s",
//!     summary.matched,
//!     summary.unmatched,
//!     summary.failed,
//!     summary.duration.as_secs_f64()
//! );
//! # Ok::<(), crosscheck::CrossCheckError>(())
//! ```
//!
//! # Lower-level pieces
//!
//! The components behind the builder are public for callers that want to
//! drive them directly: [`scan`] and [`scan_lines`] for the membership test,
//! [`Extractor`] for unique-name extraction, [`ReportAggregator`] for the
//! report, [`partition`]/[`dispatch`] with a [`WorkerPool`], and
//! [`CompletionBarrier`] to wait on the returned [`TaskHandle`]s.

#![forbid(unsafe_code)]

pub mod logging;

mod archive;
mod barrier;
mod builder;
mod context;
mod dispatch;
mod engine;
mod error;
mod extractor;
mod pool;
mod report;
mod results;
mod scanner;
mod source;
mod tokens;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use archive::ArchiveHandle;
pub use barrier::{CompletionBarrier, DEFAULT_PROGRESS_INTERVAL};
pub use builder::{CrossCheckBuilder, WORKERS_PER_BATCH_SLOT};
pub use context::RunContext;
pub use dispatch::{dispatch, partition, process_batch, Batch, DEFAULT_BATCH_SIZE};
pub use error::CrossCheckError;
pub use extractor::{entry_base_name, Extractor};
pub use pool::{TaskHandle, WorkerPool};
pub use report::{missed_message, ReportAggregator, DEFAULT_REPORT_FILE};
pub use results::RunSummary;
pub use scanner::{scan, scan_lines, MatchVerdict};
pub use source::{check_folder, first_file, list_files, DirectorySource};
pub use tokens::TokenSet;
pub use traits::Source;

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`CrossCheckBuilder`] to configure and run a cross check.
pub fn crosscheck() -> CrossCheckBuilder {
    CrossCheckBuilder::default()
}
