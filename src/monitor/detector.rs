//! Breach detection for one poll tick.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::monitor::phase::{Phase, PhaseTimers};
use crate::monitor::types::{BreachRecord, CorrelationIds};
use crate::observability::metrics::{timeout_counter, MetricsSink};

/// Compares every phase timer against the timeout.
#[derive(Clone)]
pub struct BreachDetector {
    timers: Arc<PhaseTimers>,
    timeout: Duration,
    correlation: CorrelationIds,
    metrics: Arc<dyn MetricsSink>,
}

impl BreachDetector {
    pub fn new(
        timers: Arc<PhaseTimers>,
        timeout: Duration,
        correlation: CorrelationIds,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            timers,
            timeout,
            correlation,
            metrics,
        }
    }

    /// Return the first phase, in declared order, that has been running for
    /// longer than the timeout.
    ///
    /// The breach is metered here, before anyone decides whether it is fatal.
    /// Later phases are not examined once one has breached.
    pub fn check_all(&self, now: Instant) -> Option<BreachRecord> {
        Phase::ALL.into_iter().find_map(|phase| self.check(phase, now))
    }

    fn check(&self, phase: Phase, now: Instant) -> Option<BreachRecord> {
        let elapsed = self.timers.get(phase).elapsed_since(now)?;
        if elapsed <= self.timeout {
            return None;
        }

        tracing::error!(
            phase = %phase,
            elapsed = ?elapsed,
            timeout = ?self.timeout,
            connection_id = %self.correlation.connection_id,
            "Destination has timed out on {} call",
            phase
        );
        self.metrics.count(
            timeout_counter(phase),
            &self.correlation.connection_id.to_string(),
        );

        Some(BreachRecord {
            phase,
            elapsed_at_detection: elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::observability::metrics::{
        DESTINATION_ACCEPT_TIMEOUT, DESTINATION_NOTIFY_END_OF_INPUT_TIMEOUT,
    };

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(&'static str, String)>>);

    impl MetricsSink for Recorder {
        fn count(&self, counter: &'static str, connection_id: &str) {
            self.0.lock().unwrap().push((counter, connection_id.to_string()));
        }
    }

    fn detector(timers: &Arc<PhaseTimers>, recorder: &Arc<Recorder>) -> BreachDetector {
        BreachDetector::new(
            timers.clone(),
            Duration::from_secs(5),
            CorrelationIds::default(),
            recorder.clone(),
        )
    }

    #[test]
    fn test_no_breach_when_idle() {
        let timers = Arc::new(PhaseTimers::new());
        let recorder = Arc::new(Recorder::default());
        assert_eq!(detector(&timers, &recorder).check_all(Instant::now()), None);
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_elapsed_equal_to_timeout_is_not_a_breach() {
        let timers = Arc::new(PhaseTimers::new());
        let recorder = Arc::new(Recorder::default());
        let t0 = Instant::now();
        timers.get(Phase::Accept).start_at(t0);

        let found = detector(&timers, &recorder).check_all(t0 + Duration::from_secs(5));
        assert_eq!(found, None);
    }

    #[test]
    fn test_breach_reports_phase_and_elapsed() {
        let timers = Arc::new(PhaseTimers::new());
        let recorder = Arc::new(Recorder::default());
        let t0 = Instant::now();
        timers.get(Phase::NotifyEndOfInput).start_at(t0);

        let found = detector(&timers, &recorder).check_all(t0 + Duration::from_secs(6));
        assert_eq!(
            found,
            Some(BreachRecord {
                phase: Phase::NotifyEndOfInput,
                elapsed_at_detection: Duration::from_secs(6),
            })
        );
        let recorded = recorder.0.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, DESTINATION_NOTIFY_END_OF_INPUT_TIMEOUT);
        assert_eq!(recorded[0].1, uuid::Uuid::nil().to_string());
    }

    #[test]
    fn test_accept_wins_when_both_phases_breach() {
        let timers = Arc::new(PhaseTimers::new());
        let recorder = Arc::new(Recorder::default());
        let t0 = Instant::now();
        timers.get(Phase::NotifyEndOfInput).start_at(t0);
        timers.get(Phase::Accept).start_at(t0 + Duration::from_secs(1));

        let found = detector(&timers, &recorder)
            .check_all(t0 + Duration::from_secs(10))
            .unwrap();
        assert_eq!(found.phase, Phase::Accept);
        assert_eq!(found.elapsed_at_detection, Duration::from_secs(9));

        let recorded = recorder.0.lock().unwrap();
        assert_eq!(recorded.len(), 1, "only the first breach is metered");
        assert_eq!(recorded[0].0, DESTINATION_ACCEPT_TIMEOUT);
    }
}
