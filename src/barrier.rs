use std::time::{Duration, Instant};

use crate::error::CrossCheckError;
use crate::pool::TaskHandle;

/// Default interval between "waiting" progress lines.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Blocks the driver until every submitted task has finished.
///
/// Waiting is a blocking receive on each handle in turn, woken only to log
/// progress every `progress_interval`. Without a deadline a task that never
/// finishes keeps `await_all` waiting forever.
#[derive(Debug, Clone)]
pub struct CompletionBarrier {
    progress_interval: Duration,
    deadline:          Option<Duration>,
}

impl Default for CompletionBarrier {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            deadline:          None,
        }
    }
}

impl CompletionBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Give up after `deadline`, measured from the start of `await_all`.
    pub fn deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Wait for every handle to complete.
    ///
    /// # Errors
    ///
    /// [`CrossCheckError::Timeout`] with the number of unfinished tasks if the
    /// deadline passes first.
    pub fn await_all(&self, handles: &[TaskHandle]) -> Result<(), CrossCheckError> {
        let start = Instant::now();
        let interval = self.progress_interval.max(Duration::from_millis(1));

        for (i, handle) in handles.iter().enumerate() {
            loop {
                let wait = match self.deadline {
                    Some(deadline) => {
                        let left = deadline.saturating_sub(start.elapsed());
                        if left.is_zero() && !handle.is_done() {
                            let pending = handles[i..].iter().filter(|h| !h.is_done()).count();
                            tracing::warn!(pending, "deadline reached before all tasks completed");
                            return Err(CrossCheckError::Timeout { pending });
                        }
                        left.min(interval)
                    }
                    None => interval,
                };

                if handle.wait_timeout(wait) {
                    break;
                }
                if wait == interval {
                    let pending = handles[i..].iter().filter(|h| !h.is_done()).count();
                    tracing::info!(pending, total = handles.len(), "waiting for tasks to complete");
                }
            }
        }

        tracing::info!(tasks = handles.len(), "all tasks completed");
        Ok(())
    }
}
