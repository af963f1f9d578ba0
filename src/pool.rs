//! Fixed-size worker pool.
//!
//! Workers pull boxed tasks from one bounded queue, so submission only blocks
//! while the queue is full. Every submitted task gets a [`TaskHandle`] whose
//! completion is signalled by dropping the sender half of a private channel
//! once the task returns or unwinds. A panicking task therefore still counts
//! as done, and the worker that ran it keeps serving the queue.

use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};

use crate::error::CrossCheckError;

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct WorkerPool {
    workers: Vec<thread::JoinHandle<()>>,
    job_tx: Option<Sender<Job>>,
}

impl WorkerPool {
    /// Spawn `num_workers` threads sharing a queue of `queue_capacity` tasks.
    pub fn new(num_workers: usize, queue_capacity: usize) -> Result<Self, CrossCheckError> {
        if num_workers == 0 {
            return Err(CrossCheckError::InvalidWorkerCount(num_workers));
        }
        if queue_capacity == 0 {
            return Err(CrossCheckError::ThreadPool(
                "queue capacity must be greater than zero".into(),
            ));
        }

        let (job_tx, job_rx) = bounded::<Job>(queue_capacity);
        let mut workers = Vec::with_capacity(num_workers);

        for worker_id in 0..num_workers {
            let job_rx = job_rx.clone();
            let handle = thread::Builder::new()
                .name(format!("crosscheck-worker-{worker_id}"))
                .spawn(move || worker_loop(job_rx))
                .map_err(|e| {
                    CrossCheckError::ThreadPool(format!("failed to spawn worker {worker_id}: {e}"))
                })?;
            workers.push(handle);
        }

        Ok(Self {
            workers,
            job_tx: Some(job_tx),
        })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Close the queue without joining the workers.
    ///
    /// Workers still finish whatever is queued, then exit on their own.
    pub fn detach(mut self) {
        self.job_tx.take();
        self.workers.clear();
    }

    /// Queue `task` and return a handle that completes when it has run.
    pub fn submit<F>(&self, task_id: usize, task: F) -> Result<TaskHandle, CrossCheckError>
    where
        F: FnOnce() + Send + 'static,
    {
        let job_tx = self
            .job_tx
            .as_ref()
            .ok_or_else(|| CrossCheckError::ThreadPool("pool is shut down".into()))?;

        let (done_tx, done_rx) = bounded::<()>(0);
        let job: Job = Box::new(move || {
            // Dropped on return or unwind; either way the handle sees a disconnect.
            let _done = done_tx;
            task();
        });

        job_tx
            .send(job)
            .map_err(|_| CrossCheckError::ThreadPool("all workers have exited".into()))?;

        Ok(TaskHandle {
            id: task_id,
            done: done_rx,
        })
    }
}

fn worker_loop(jobs: Receiver<Job>) {
    while let Ok(job) = jobs.recv() {
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            tracing::error!(
                worker = thread::current().name().unwrap_or("unnamed"),
                "task panicked, rest of its batch abandoned"
            );
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the queue lets workers drain what is left and exit.
        self.job_tx.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

/// Completion handle for one submitted task.
#[derive(Debug)]
pub struct TaskHandle {
    id: usize,
    done: Receiver<()>,
}

impl TaskHandle {
    pub fn id(&self) -> usize {
        self.id
    }

    /// Non-blocking completion check.
    pub fn is_done(&self) -> bool {
        matches!(self.done.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Block until the task is done or `timeout` elapses. Returns `true` if done.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        matches!(
            self.done.recv_timeout(timeout),
            Err(RecvTimeoutError::Disconnected)
        )
    }

    /// Block until the task is done.
    pub fn wait(&self) {
        let _ = self.done.recv();
    }
}
