use std::sync::Arc;
use std::thread;

use crate::archive::ArchiveHandle;
use crate::context::RunContext;
use crate::error::CrossCheckError;
use crate::pool::{TaskHandle, WorkerPool};
use crate::scanner::{scan, MatchVerdict};

/// Default number of archives per task.
pub const DEFAULT_BATCH_SIZE: usize = 2;

/// A contiguous run of archives handled by one task, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub index:    usize,
    pub archives: Vec<ArchiveHandle>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.archives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }
}

/// Split `files` into consecutive batches of at most `batch_size`.
///
/// Produces `ceil(N / batch_size)` batches; only the last may be short.
pub fn partition(
    files: Vec<ArchiveHandle>,
    batch_size: usize,
) -> Result<Vec<Batch>, CrossCheckError> {
    if batch_size == 0 {
        return Err(CrossCheckError::InvalidBatchSize(batch_size));
    }

    let mut batches = Vec::with_capacity(files.len().div_ceil(batch_size));
    let mut files = files.into_iter().peekable();
    while files.peek().is_some() {
        batches.push(Batch {
            index:    batches.len(),
            archives: files.by_ref().take(batch_size).collect(),
        });
    }
    Ok(batches)
}

/// Partition `files` and submit one task per batch to `pool`.
///
/// Returns the handles in submission order.
pub fn dispatch(
    files: Vec<ArchiveHandle>,
    batch_size: usize,
    pool: &WorkerPool,
    ctx: &Arc<RunContext>,
) -> Result<Vec<TaskHandle>, CrossCheckError> {
    let batches = partition(files, batch_size)?;
    tracing::debug!(batches = batches.len(), batch_size, "dispatching");

    batches
        .into_iter()
        .map(|batch| {
            let ctx = Arc::clone(ctx);
            pool.submit(batch.index, move || process_batch(&batch, &ctx))
        })
        .collect()
}

/// Run every archive of `batch` through scan and extract/report, in order.
///
/// A failing archive is logged and skipped; the rest of the batch continues.
pub fn process_batch(batch: &Batch, ctx: &RunContext) {
    let worker = thread::current();
    let worker = worker.name().unwrap_or("unnamed");
    tracing::debug!(worker, batch = batch.index, size = batch.len(), "batch started");

    for archive in &batch.archives {
        if let Err(err) = process_archive(archive, ctx) {
            tracing::error!(worker, archive = %archive.name, "{err}");
            ctx.record_failure(err);
        }
    }

    tracing::debug!(worker, batch = batch.index, "batch finished");
}

fn process_archive(archive: &ArchiveHandle, ctx: &RunContext) -> Result<(), CrossCheckError> {
    tracing::info!(archive = %archive.name, "started searching");

    match scan(archive, &ctx.tokens)? {
        MatchVerdict::Matched { line } => {
            tracing::info!(archive = %archive.name, %line, "contains search string");
            let target = ctx.extractor.extract(archive, &ctx.output_dir)?;
            tracing::info!(archive = %archive.name, output = %target.display(), "done unzipping");
            ctx.record_extracted(target);
        }
        MatchVerdict::Unmatched => {
            tracing::info!(archive = %archive.name, "no search string found");
            ctx.record_unmatched(&archive.name);
        }
    }
    Ok(())
}
