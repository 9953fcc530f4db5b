//! Watchdog configuration and breach types.

use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::monitor::Phase;

/// Default spacing between poll ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Default time allowed for the worker to exit on shutdown before it is aborted.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Identifiers attached to every log line and metric the monitor emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CorrelationIds {
    pub workspace_id: Uuid,
    pub connection_id: Uuid,
}

impl CorrelationIds {
    pub fn new(workspace_id: Uuid, connection_id: Uuid) -> Self {
        Self {
            workspace_id,
            connection_id,
        }
    }
}

/// Immutable settings for one monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchdogConfig {
    /// Longest a phase may run before it counts as a breach.
    pub timeout: Duration,
    /// Spacing between poll ticks.
    pub poll_interval: Duration,
    /// Time the worker gets to observe cancellation on shutdown.
    pub shutdown_grace: Duration,
    pub correlation: CorrelationIds,
}

impl WatchdogConfig {
    /// Config with the default poll interval and grace period.
    pub fn new(timeout: Duration, correlation: CorrelationIds) -> Self {
        Self {
            timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            correlation,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_shutdown_grace(mut self, shutdown_grace: Duration) -> Self {
        self.shutdown_grace = shutdown_grace;
        self
    }
}

/// A detected stall: which phase, and how long it had been running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreachRecord {
    pub phase: Phase,
    pub elapsed_at_detection: Duration,
}

impl fmt::Display for BreachRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} running for {:?}",
            self.phase, self.elapsed_at_detection
        )
    }
}
