//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the worker.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::monitor::{CorrelationIds, WatchdogConfig};

/// Root configuration for the destination worker.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct WorkerConfig {
    /// Timeout monitor settings.
    pub monitor: MonitorConfig,

    /// Identifiers used for log and metric correlation.
    pub connection: ConnectionConfig,

    /// Destination process to stream records into.
    pub destination: DestinationConfig,

    /// Heartbeat endpoint settings.
    pub heartbeat: HeartbeatConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl WorkerConfig {
    /// Watchdog settings for the configured connection.
    pub fn watchdog(&self) -> WatchdogConfig {
        WatchdogConfig::new(
            Duration::from_secs(self.monitor.timeout_secs),
            CorrelationIds::new(self.connection.workspace_id, self.connection.connection_id),
        )
        .with_poll_interval(Duration::from_secs(self.monitor.poll_interval_secs))
        .with_shutdown_grace(Duration::from_secs(self.monitor.shutdown_grace_secs))
    }
}

/// Timeout monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Longest an accept or notify-end-of-input call may run, in seconds.
    pub timeout_secs: u64,

    /// Poll interval of the watchdog in seconds.
    pub poll_interval_secs: u64,

    /// Fail the run on timeout. Re-read at every breach, so a config reload
    /// takes effect mid-run.
    pub fail_on_timeout: bool,

    /// Grace period for stopping the watchdog worker in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 7200,
            poll_interval_secs: 60,
            fail_on_timeout: false,
            shutdown_grace_secs: 10,
        }
    }
}

/// Correlation identifiers.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ConnectionConfig {
    pub workspace_id: Uuid,
    pub connection_id: Uuid,
}

/// Destination process configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct DestinationConfig {
    /// Program to spawn.
    pub command: String,

    /// Arguments passed to the program.
    pub args: Vec<String>,
}

/// Heartbeat endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HeartbeatConfig {
    /// Serve the heartbeat endpoint.
    pub enabled: bool,

    /// Bind address (e.g., "0.0.0.0:9000").
    pub bind_address: String,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:9000".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
