//! Executors that run panorama load jobs off the caller's control flow.
//!
//! The loader never starts work on its own: it is handed an executor at
//! construction. `ThreadExecutor` runs jobs on a named background thread;
//! `ManualExecutor` queues them until the host decides to run them, which keeps
//! single-threaded hosts and tests fully deterministic.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// A unit of background work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run jobs on behalf of the loader.
pub trait Executor: Send + Sync {
    /// Schedule a job. Jobs may run in any order relative to the caller.
    fn spawn(&self, job: Job);
}

/// Message sent to the worker thread.
enum ThreadMessage {
    /// Run a job
    Run(Job),
    /// Shutdown the thread
    Shutdown,
}

/// Runs jobs one after another on a dedicated background thread.
pub struct ThreadExecutor {
    /// Sender for jobs to the background thread
    job_tx: Mutex<Sender<ThreadMessage>>,
    /// Handle to the background thread (for joining on drop)
    thread_handle: Option<JoinHandle<()>>,
}

impl ThreadExecutor {
    /// Spawn a new worker thread with the given name.
    ///
    /// Returns `Err` if the thread fails to spawn.
    pub fn spawn(name: &str) -> Result<Self, String> {
        let (job_tx, job_rx) = mpsc::channel::<ThreadMessage>();
        let thread_name = name.to_string();

        let thread_handle = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                log::info!("Worker thread '{}' started", thread_name);
                Self::thread_loop(job_rx);
                log::info!("Worker thread '{}' exiting", thread_name);
            })
            .map_err(|e| format!("Failed to spawn worker thread: {}", e))?;

        Ok(Self {
            job_tx: Mutex::new(job_tx),
            thread_handle: Some(thread_handle),
        })
    }

    /// Background thread main loop.
    fn thread_loop(job_rx: Receiver<ThreadMessage>) {
        loop {
            match job_rx.recv() {
                Ok(ThreadMessage::Run(job)) => {
                    // A panicking job must not take the worker down with it
                    if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                        log::error!("Job panicked, worker thread continues");
                    }
                }
                Ok(ThreadMessage::Shutdown) => {
                    log::debug!("Received shutdown signal");
                    break;
                }
                Err(_) => {
                    log::debug!("Job channel closed, worker thread exiting");
                    break;
                }
            }
        }
    }
}

impl Executor for ThreadExecutor {
    fn spawn(&self, job: Job) {
        let sent = match self.job_tx.lock() {
            Ok(tx) => tx.send(ThreadMessage::Run(job)).is_ok(),
            Err(_) => false,
        };
        if !sent {
            log::error!("Failed to schedule job: worker thread is gone");
        }
    }
}

impl Drop for ThreadExecutor {
    fn drop(&mut self) {
        log::debug!("Shutting down worker thread");

        if let Ok(tx) = self.job_tx.lock() {
            let _ = tx.send(ThreadMessage::Shutdown);
        }

        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                log::warn!("Worker thread panicked: {:?}", e);
            }
        }
    }
}

/// Queues jobs and runs them only when asked.
#[derive(Default)]
pub struct ManualExecutor {
    queue: Mutex<VecDeque<Job>>,
}

impl ManualExecutor {
    /// Create an empty executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs waiting to run.
    pub fn pending_count(&self) -> usize {
        self.queue.lock().map(|q| q.len()).unwrap_or(0)
    }

    /// Run the job at `index` in the queue (0 = oldest). Returns false if there is none.
    pub fn run_at(&self, index: usize) -> bool {
        // Take the job out before running it so it may schedule more work
        let job = match self.queue.lock() {
            Ok(mut queue) => queue.remove(index),
            Err(_) => None,
        };
        match job {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Run the oldest queued job.
    pub fn run_next(&self) -> bool {
        self.run_at(0)
    }

    /// Run the newest queued job.
    pub fn run_latest(&self) -> bool {
        match self.pending_count() {
            0 => false,
            n => self.run_at(n - 1),
        }
    }

    /// Run every queued job, including ones scheduled while running. Returns how many ran.
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }
}

impl Executor for ManualExecutor {
    fn spawn(&self, job: Job) {
        match self.queue.lock() {
            Ok(mut queue) => queue.push_back(job),
            Err(_) => log::error!("Manual executor queue poisoned, dropping job"),
        }
    }
}
