//! The watchdog poll loop.
//!
//! # State Transitions
//! ```text
//! Idle → Polling: run() starts
//! Polling → BreachFound: a tick's check returned a breach
//! Polling → Cancelled: cancellation requested (interrupts the sleep)
//! ```
//!
//! A scheduler runs once. Detection is single-shot: after the first breach
//! the loop ends and nothing else is checked for that run.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};

use crate::monitor::detector::BreachDetector;
use crate::monitor::types::BreachRecord;

/// Scheduler lifecycle state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle = 0,
    Polling = 1,
    BreachFound = 2,
    Cancelled = 3,
}

impl From<u8> for SchedulerState {
    fn from(val: u8) -> Self {
        match val {
            1 => SchedulerState::Polling,
            2 => SchedulerState::BreachFound,
            3 => SchedulerState::Cancelled,
            _ => SchedulerState::Idle,
        }
    }
}

/// How a scheduler run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogOutcome {
    Breach(BreachRecord),
    Cancelled,
}

/// Control side of a scheduler: cancellation and state inspection.
#[derive(Debug, Clone)]
pub struct WatchdogHandle {
    cancel: Arc<watch::Sender<bool>>,
    state: Arc<AtomicU8>,
}

impl WatchdogHandle {
    /// Request cancellation. Idempotent, and safe after the run has ended.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    pub fn state(&self) -> SchedulerState {
        SchedulerState::from(self.state.load(Ordering::Acquire))
    }
}

/// Periodically runs a [`BreachDetector`] until a breach or cancellation.
pub struct WatchdogScheduler {
    detector: BreachDetector,
    poll_interval: Duration,
    cancel: watch::Receiver<bool>,
    state: Arc<AtomicU8>,
}

impl WatchdogScheduler {
    /// Create an idle scheduler and the handle that controls it.
    pub fn new(detector: BreachDetector, poll_interval: Duration) -> (Self, WatchdogHandle) {
        let (tx, rx) = watch::channel(false);
        let state = Arc::new(AtomicU8::new(SchedulerState::Idle as u8));
        let handle = WatchdogHandle {
            cancel: Arc::new(tx),
            state: state.clone(),
        };
        let scheduler = Self {
            detector,
            poll_interval,
            cancel: rx,
            state,
        };
        (scheduler, handle)
    }

    /// Poll until the first breach or until cancelled.
    pub async fn run(mut self) -> WatchdogOutcome {
        self.set_state(SchedulerState::Polling);
        tracing::debug!(poll_interval = ?self.poll_interval, "Timeout monitor polling");

        loop {
            tokio::select! {
                biased;
                _ = cancelled(&mut self.cancel) => return self.stop(),
                _ = sleep(self.poll_interval) => {}
            }

            if *self.cancel.borrow() {
                return self.stop();
            }

            if let Some(breach) = self.detector.check_all(Instant::now()) {
                self.set_state(SchedulerState::BreachFound);
                return WatchdogOutcome::Breach(breach);
            }
        }
    }

    fn stop(&self) -> WatchdogOutcome {
        tracing::debug!("Stopping timeout monitor");
        self.set_state(SchedulerState::Cancelled);
        WatchdogOutcome::Cancelled
    }

    fn set_state(&self, state: SchedulerState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

/// Resolves once cancellation is requested or the handle is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    // A closed channel means every handle was dropped; stop either way.
    let _ = rx.wait_for(|cancelled| *cancelled).await;
}
