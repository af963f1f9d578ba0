use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use crate::archive::ArchiveHandle;
use crate::barrier::CompletionBarrier;
use crate::context::RunContext;
use crate::dispatch::dispatch;
use crate::error::CrossCheckError;
use crate::pool::WorkerPool;
use crate::results::RunSummary;
use crate::tokens::TokenSet;

// ---------------------------------------------------------------------------
// PoolConfig
// ---------------------------------------------------------------------------

/// Pool sizing passed from the builder to the engine.
///
/// Callers configure these via `.batch_size()`,
/// `.workers()` and `.queue_capacity()`.
pub(crate) struct PoolConfig {
    pub batch_size:     usize,
    pub workers:        usize,
    pub queue_capacity: usize,
}

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Validated inputs for one run.
pub(crate) struct EngineOptions {
    pub config:      PoolConfig,
    pub tokens:      Arc<TokenSet>,
    pub archives:    Vec<ArchiveHandle>,
    pub output_dir:  PathBuf,
    pub report_path: PathBuf,
    pub barrier:     CompletionBarrier,
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// Dispatch every archive, wait for all tasks, then flush the report.
///
/// The token set is complete before the first task is submitted, and the
/// report is only touched by the flush after the barrier has returned.
pub(crate) fn run(opts: EngineOptions) -> Result<RunSummary, CrossCheckError> {
    let start = Instant::now();
    let archives = opts.archives.len();

    // Workers beyond the batch count would never receive a task.
    let batches = archives.div_ceil(opts.config.batch_size).max(1);
    let workers = opts.config.workers.min(batches);
    let queue_capacity = opts.config.queue_capacity.min(batches);

    let ctx = Arc::new(RunContext::new(opts.tokens, opts.output_dir));
    let pool = WorkerPool::new(workers, queue_capacity)?;
    tracing::info!(
        archives,
        workers = pool.size(),
        batch_size = opts.config.batch_size,
        tokens = ctx.tokens.len(),
        "starting cross check"
    );

    let handles = dispatch(opts.archives, opts.config.batch_size, &pool, &ctx)?;
    if let Err(err) = opts.barrier.await_all(&handles) {
        // Joining would block on the tasks that missed the deadline.
        pool.detach();
        return Err(err);
    }

    ctx.report.flush(&opts.report_path)?;
    drop(pool);

    Ok(RunSummary {
        archives,
        batches:   handles.len(),
        workers,
        matched:   ctx.matched.load(Ordering::Relaxed),
        unmatched: ctx.unmatched.load(Ordering::Relaxed),
        failed:    ctx.failed.load(Ordering::Relaxed),
        extracted: ctx.take_extracted(),
        errors:    ctx.take_errors(),
        duration:  start.elapsed(),
    })
}
