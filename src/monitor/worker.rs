//! Dedicated background worker that runs watchdog schedulers.
//!
//! # Responsibilities
//! - Run one scheduler at a time, in submission order
//! - Outlive individual supervised runs so repeated runs reuse it
//! - Exit on request, letting an in-flight poll observe cancellation
//!
//! # Design Decisions
//! - One long-lived tokio task fed by an unbounded job channel
//! - Shutdown is bounded: after the grace period the task is aborted
//! - Dropping the worker aborts the task

use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::monitor::scheduler::{WatchdogHandle, WatchdogOutcome, WatchdogScheduler};

/// Errors from submitting work to the worker.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkerError {
    /// The worker task has exited and accepts no more jobs.
    #[error("watchdog worker is not running")]
    Unavailable,
}

/// How the worker task ended on shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// Exited on its own within the grace period.
    Graceful,
    /// Did not exit in time and was aborted.
    Forced,
}

struct WatchdogJob {
    scheduler: WatchdogScheduler,
    handle: WatchdogHandle,
    reply: oneshot::Sender<WatchdogOutcome>,
}

/// Single-task execution context for watchdog schedulers.
pub struct WatchdogWorker {
    jobs: mpsc::UnboundedSender<WatchdogJob>,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl WatchdogWorker {
    /// Spawn the worker task on the current runtime.
    pub fn spawn() -> Self {
        let (jobs, rx) = mpsc::unbounded_channel();
        let (stop, stop_rx) = watch::channel(false);
        let task = tokio::spawn(worker_loop(rx, stop_rx));
        tracing::debug!("Timeout monitor worker started");
        Self { jobs, stop, task }
    }

    /// Whether the worker can still accept jobs.
    pub fn is_running(&self) -> bool {
        !self.jobs.is_closed() && !self.task.is_finished()
    }

    /// Queue `scheduler` and return a receiver for its outcome.
    pub fn submit(
        &self,
        scheduler: WatchdogScheduler,
        handle: WatchdogHandle,
    ) -> Result<oneshot::Receiver<WatchdogOutcome>, WorkerError> {
        let (reply, outcome) = oneshot::channel();
        self.jobs
            .send(WatchdogJob {
                scheduler,
                handle,
                reply,
            })
            .map_err(|_| WorkerError::Unavailable)?;
        Ok(outcome)
    }

    /// Stop the worker, waiting up to `grace` before aborting it.
    pub async fn shutdown(mut self, grace: Duration) -> WorkerExit {
        self.stop.send_replace(true);

        match tokio::time::timeout(grace, &mut self.task).await {
            Ok(Ok(())) => {
                tracing::debug!("Timeout monitor worker stopped");
                WorkerExit::Graceful
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Timeout monitor worker ended abnormally");
                WorkerExit::Graceful
            }
            Err(_) => {
                tracing::warn!(grace = ?grace, "Timeout monitor worker did not stop in time, aborting");
                self.task.abort();
                WorkerExit::Forced
            }
        }
    }
}

impl Drop for WatchdogWorker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn worker_loop(
    mut jobs: mpsc::UnboundedReceiver<WatchdogJob>,
    mut stop: watch::Receiver<bool>,
) {
    loop {
        let job = tokio::select! {
            biased;
            _ = stopped(&mut stop) => break,
            job = jobs.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        let WatchdogJob {
            scheduler,
            handle,
            reply,
        } = job;

        let run = scheduler.run();
        tokio::pin!(run);
        let outcome = tokio::select! {
            biased;
            outcome = &mut run => outcome,
            _ = stopped(&mut stop) => {
                handle.cancel();
                run.await
            }
        };

        // The supervisor may already have moved on.
        let _ = reply.send(outcome);
    }
}

async fn stopped(stop: &mut watch::Receiver<bool>) {
    let _ = stop.wait_for(|stopped| *stopped).await;
}
