//! Destination wrapper that feeds the timeout monitor.

use crate::destination::{Destination, DestinationError};
use crate::monitor::TimeoutMonitor;

/// Brackets every destination call with the matching phase timer.
pub struct TimedDestination<'m, D> {
    inner: D,
    monitor: &'m TimeoutMonitor,
    accepted: u64,
}

impl<'m, D: Destination> TimedDestination<'m, D> {
    pub fn new(inner: D, monitor: &'m TimeoutMonitor) -> Self {
        Self {
            inner,
            monitor,
            accepted: 0,
        }
    }

    pub async fn accept(&mut self, record: &[u8]) -> Result<(), DestinationError> {
        self.monitor.start_accept_timer();
        let result = self.inner.accept(record).await;
        self.monitor.reset_accept_timer();
        if result.is_ok() {
            self.accepted += 1;
        }
        result
    }

    pub async fn notify_end_of_input(&mut self) -> Result<(), DestinationError> {
        self.monitor.start_notify_end_of_input_timer();
        let result = self.inner.notify_end_of_input().await;
        self.monitor.reset_notify_end_of_input_timer();
        result
    }

    /// Records accepted successfully so far.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}
