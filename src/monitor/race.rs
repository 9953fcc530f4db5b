//! Supervising a primary task against the watchdog.
//!
//! # Outcome Resolution
//! ```text
//! primary finishes first (ties included) → cancel watchdog, return primary outcome as-is
//! watchdog reports a breach first        → ask the policy, now:
//!     fatal     → drop (cancel) the primary, return TimeoutError
//!     not fatal → log, keep waiting for the primary, return its outcome
//! host shutdown while waiting            → cancel watchdog, return Interrupted
//! ```
//! The watchdog is cancelled before `supervise` returns on every path,
//! including when the `supervise` future itself is dropped.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use tokio::sync::oneshot;

use crate::lifecycle::ShutdownListener;
use crate::monitor::detector::BreachDetector;
use crate::monitor::error::{Completion, SupervisionError, TimeoutError};
use crate::monitor::phase::{Phase, PhaseTimers};
use crate::monitor::policy::{FixedPolicy, TimeoutPolicy};
use crate::monitor::scheduler::{SchedulerState, WatchdogHandle, WatchdogOutcome, WatchdogScheduler};
use crate::monitor::types::{BreachRecord, WatchdogConfig};
use crate::monitor::worker::{WatchdogWorker, WorkerExit};
use crate::observability::metrics::MetricsSink;

/// Tracks `accept` and `notify_end_of_input` call durations for one
/// destination and fails supervised runs that stall.
///
/// Callers bracket each destination call with the matching `start_*` and
/// `reset_*` methods while [`TimeoutMonitor::supervise`] is driving the work.
pub struct TimeoutMonitor {
    config: WatchdogConfig,
    timers: Arc<PhaseTimers>,
    detector: BreachDetector,
    policy: Arc<dyn TimeoutPolicy>,
    shutdown: Option<ShutdownListener>,
    worker: Mutex<Option<WatchdogWorker>>,
    workers_started: AtomicUsize,
    last_breach: ArcSwapOption<BreachRecord>,
    last_watchdog: ArcSwapOption<WatchdogHandle>,
}

impl TimeoutMonitor {
    pub fn new(
        config: WatchdogConfig,
        policy: Arc<dyn TimeoutPolicy>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        let timers = Arc::new(PhaseTimers::new());
        let detector = BreachDetector::new(
            timers.clone(),
            config.timeout,
            config.correlation,
            metrics,
        );
        Self {
            config,
            timers,
            detector,
            policy,
            shutdown: None,
            worker: Mutex::new(None),
            workers_started: AtomicUsize::new(0),
            last_breach: ArcSwapOption::empty(),
            last_watchdog: ArcSwapOption::empty(),
        }
    }

    /// Monitor whose breaches are fatal iff `fail_on_timeout`.
    pub fn with_fail_on_timeout(
        config: WatchdogConfig,
        fail_on_timeout: bool,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self::new(config, Arc::new(FixedPolicy(fail_on_timeout)), metrics)
    }

    /// Stop waiting (without error) when `shutdown` fires.
    pub fn with_shutdown(mut self, shutdown: ShutdownListener) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Start the accept clock. Restarts it if already running.
    pub fn start_accept_timer(&self) {
        self.timers.get(Phase::Accept).start();
    }

    pub fn reset_accept_timer(&self) {
        self.timers.get(Phase::Accept).reset();
    }

    /// Start the notify-end-of-input clock. Restarts it if already running.
    pub fn start_notify_end_of_input_timer(&self) {
        self.timers.get(Phase::NotifyEndOfInput).start();
    }

    pub fn reset_notify_end_of_input_timer(&self) {
        self.timers.get(Phase::NotifyEndOfInput).reset();
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    pub fn config(&self) -> &WatchdogConfig {
        &self.config
    }

    /// Most recent breach, kept even when the policy suppressed it.
    pub fn last_breach(&self) -> Option<BreachRecord> {
        self.last_breach.load_full().map(|breach| *breach)
    }

    /// Check every phase once, right now. Breaches found here are metered
    /// and remembered like those found by the watchdog.
    pub fn has_timed_out(&self) -> bool {
        match self.detector.check_all(tokio::time::Instant::now()) {
            Some(breach) => {
                self.last_breach.store(Some(Arc::new(breach)));
                true
            }
            None => false,
        }
    }

    /// State of the watchdog from the most recent supervised run.
    pub fn watchdog_state(&self) -> SchedulerState {
        self.last_watchdog
            .load_full()
            .map_or(SchedulerState::Idle, |handle| handle.state())
    }

    /// How many worker tasks this monitor has spawned.
    pub fn workers_started(&self) -> usize {
        self.workers_started.load(Ordering::Relaxed)
    }

    /// Run `primary` while the watchdog polls for stalled phases.
    ///
    /// Dropping `primary` is how it gets cancelled on a fatal timeout or on
    /// shutdown; hand in a future that owns the work (not a detached
    /// `JoinHandle`) if that cancellation should reach it.
    pub async fn supervise<T, E, F>(&self, primary: F) -> Result<Completion<T>, SupervisionError<E>>
    where
        F: Future<Output = Result<T, E>>,
    {
        let (handle, watchdog) = self.start_watchdog();
        let _cancel_on_exit = CancelOnDrop(handle);
        let mut shutdown = self.shutdown.clone();
        tokio::pin!(primary);

        let breach = match watchdog {
            Some(watchdog) => tokio::select! {
                biased;
                result = &mut primary => return finish(result),
                outcome = watchdog => match outcome {
                    Ok(WatchdogOutcome::Breach(breach)) => Some(breach),
                    Ok(WatchdogOutcome::Cancelled) | Err(_) => None,
                },
                _ = wait_shutdown(&mut shutdown) => return Ok(self.interrupted()),
            },
            None => None,
        };

        if let Some(breach) = breach {
            self.last_breach.store(Some(Arc::new(breach)));

            if self.policy.is_fatal() {
                tracing::warn!(
                    phase = %breach.phase,
                    elapsed = ?breach.elapsed_at_detection,
                    workspace_id = %self.config.correlation.workspace_id,
                    connection_id = %self.config.correlation.connection_id,
                    "Destination timed out, cancelling the supervised task"
                );
                return Err(SupervisionError::Timeout(TimeoutError::new(
                    breach.phase,
                    self.config.timeout,
                    breach.elapsed_at_detection,
                )));
            }

            tracing::info!(
                phase = %breach.phase,
                workspace_id = %self.config.correlation.workspace_id,
                connection_id = %self.config.correlation.connection_id,
                "Destination has timed out but the timeout is not fatal for this connection"
            );
        }

        tokio::select! {
            biased;
            result = &mut primary => finish(result),
            _ = wait_shutdown(&mut shutdown) => Ok(self.interrupted()),
        }
    }

    /// Stop the worker, giving an in-flight poll up to the configured grace
    /// period. A no-op when no worker is running.
    pub async fn shutdown(&self) -> Option<WorkerExit> {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match worker {
            Some(worker) => Some(worker.shutdown(self.config.shutdown_grace).await),
            None => None,
        }
    }

    /// Create this run's scheduler and hand it to the worker, spawning the
    /// worker on first use.
    fn start_watchdog(&self) -> (WatchdogHandle, Option<oneshot::Receiver<WatchdogOutcome>>) {
        let (scheduler, handle) =
            WatchdogScheduler::new(self.detector.clone(), self.config.poll_interval);
        self.last_watchdog.store(Some(Arc::new(handle.clone())));

        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        let running = worker.as_ref().is_some_and(WatchdogWorker::is_running);
        if !running {
            *worker = Some(WatchdogWorker::spawn());
            self.workers_started.fetch_add(1, Ordering::Relaxed);
        }

        let submitted = worker
            .as_ref()
            .map(|worker| worker.submit(scheduler, handle.clone()));
        match submitted {
            Some(Ok(outcome)) => (handle, Some(outcome)),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Running without timeout monitoring");
                (handle, None)
            }
            None => (handle, None),
        }
    }

    fn interrupted<T>(&self) -> Completion<T> {
        tracing::info!(
            connection_id = %self.config.correlation.connection_id,
            "Timeout monitor interrupted by shutdown"
        );
        Completion::Interrupted
    }
}

fn finish<T, E>(result: Result<T, E>) -> Result<Completion<T>, SupervisionError<E>> {
    result
        .map(Completion::Finished)
        .map_err(SupervisionError::Primary)
}

async fn wait_shutdown(shutdown: &mut Option<ShutdownListener>) {
    match shutdown {
        Some(listener) => listener.wait().await,
        None => std::future::pending().await,
    }
}

struct CancelOnDrop(WatchdogHandle);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}
