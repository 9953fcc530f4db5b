//! Shared utilities for supervision and endpoint tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use destination_watchdog::monitor::{CorrelationIds, TimeoutMonitor, TimeoutPolicy, WatchdogConfig};
use destination_watchdog::observability::metrics::MetricsSink;
use uuid::Uuid;

/// Metrics sink that remembers every increment.
#[derive(Default)]
pub struct RecordingMetrics {
    counts: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingMetrics {
    pub fn recorded(&self) -> Vec<(&'static str, String)> {
        self.counts.lock().unwrap().clone()
    }

    pub fn total(&self) -> usize {
        self.counts.lock().unwrap().len()
    }
}

impl MetricsSink for RecordingMetrics {
    fn count(&self, counter: &'static str, connection_id: &str) {
        self.counts
            .lock()
            .unwrap()
            .push((counter, connection_id.to_string()));
    }
}

/// Policy backed by a switch, counting how often it is asked.
#[derive(Default)]
pub struct SwitchPolicy {
    pub fatal: AtomicBool,
    pub asked: AtomicUsize,
}

impl SwitchPolicy {
    pub fn new(fatal: bool) -> Self {
        Self {
            fatal: AtomicBool::new(fatal),
            asked: AtomicUsize::new(0),
        }
    }

    pub fn asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

impl TimeoutPolicy for SwitchPolicy {
    fn is_fatal(&self) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.fatal.load(Ordering::SeqCst)
    }
}

pub fn connection_id() -> Uuid {
    Uuid::from_u128(0x6f1b2c4e_0d7a_4a57_9a6e_3f2d1c0b9a87)
}

/// `timeout=5s, poll_interval=1s`.
pub fn watchdog_config() -> WatchdogConfig {
    WatchdogConfig::new(
        Duration::from_secs(5),
        CorrelationIds::new(Uuid::from_u128(1), connection_id()),
    )
    .with_poll_interval(Duration::from_secs(1))
}

#[allow(dead_code)]
pub fn monitor(
    policy: Arc<dyn TimeoutPolicy>,
    metrics: Arc<RecordingMetrics>,
) -> TimeoutMonitor {
    TimeoutMonitor::new(watchdog_config(), policy, metrics)
}

/// Sets a flag when dropped, to observe cancellation of a primary future.
pub struct DropFlag(pub Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}
