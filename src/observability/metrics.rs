//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define watchdog metrics (per-phase timeout counters)
//! - Expose a Prometheus-compatible metrics endpoint
//! - Give the monitor a narrow sink it can be tested against
//!
//! # Metrics
//! - `worker_destination_accept_timeout` (counter): accept calls that stalled, by connection
//! - `worker_destination_notify_end_of_input_timeout` (counter): end-of-input calls that stalled, by connection
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; the exporter is optional
//! - Labels carry the connection id only (bounded cardinality per worker)

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::monitor::Phase;

/// Counter incremented when an accept call exceeds the timeout.
pub const DESTINATION_ACCEPT_TIMEOUT: &str = "worker_destination_accept_timeout";

/// Counter incremented when a notify-end-of-input call exceeds the timeout.
pub const DESTINATION_NOTIFY_END_OF_INPUT_TIMEOUT: &str =
    "worker_destination_notify_end_of_input_timeout";

/// Label key for the connection correlation id.
pub const CONNECTION_ID_LABEL: &str = "connection_id";

/// Counter name for a breach of `phase`.
pub fn timeout_counter(phase: Phase) -> &'static str {
    match phase {
        Phase::Accept => DESTINATION_ACCEPT_TIMEOUT,
        Phase::NotifyEndOfInput => DESTINATION_NOTIFY_END_OF_INPUT_TIMEOUT,
    }
}

/// Destination for counter increments emitted by the monitor.
pub trait MetricsSink: Send + Sync {
    /// Increment `counter` by one for `connection_id`.
    fn count(&self, counter: &'static str, connection_id: &str);
}

/// Sink that forwards to the globally installed `metrics` recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalMetrics;

impl MetricsSink for GlobalMetrics {
    fn count(&self, counter: &'static str, connection_id: &str) {
        metrics::counter!(counter, CONNECTION_ID_LABEL => connection_id.to_string()).increment(1);
    }
}

/// Install the Prometheus exporter listening on `addr`.
///
/// Failures are logged; the worker keeps running without an exporter.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_metrics();
            tracing::info!(address = %addr, "Prometheus exporter listening");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install Prometheus exporter");
        }
    }
}

fn describe_metrics() {
    metrics::describe_counter!(
        DESTINATION_ACCEPT_TIMEOUT,
        "Destination accept calls that exceeded the configured timeout"
    );
    metrics::describe_counter!(
        DESTINATION_NOTIFY_END_OF_INPUT_TIMEOUT,
        "Destination notify-end-of-input calls that exceeded the configured timeout"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_per_phase() {
        assert_eq!(timeout_counter(Phase::Accept), DESTINATION_ACCEPT_TIMEOUT);
        assert_eq!(
            timeout_counter(Phase::NotifyEndOfInput),
            DESTINATION_NOTIFY_END_OF_INPUT_TIMEOUT
        );
    }

    #[test]
    fn test_global_sink_without_recorder_is_noop() {
        GlobalMetrics.count(DESTINATION_ACCEPT_TIMEOUT, "abc");
    }
}
