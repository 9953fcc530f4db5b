//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, poll interval within timeout)
//! - Validate socket addresses of enabled listeners
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WorkerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system, including on reload

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::WorkerConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be greater than 0")]
    Zero { field: &'static str },

    #[error("monitor.poll_interval_secs ({poll}) must not exceed monitor.timeout_secs ({timeout})")]
    PollIntervalExceedsTimeout { poll: u64, timeout: u64 },

    #[error("{field} is not a valid socket address: '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("destination.command must not be empty")]
    MissingCommand,
}

/// Validate `config`, returning every problem found.
pub fn validate_config(config: &WorkerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let monitor = &config.monitor;

    for (field, value) in [
        ("monitor.timeout_secs", monitor.timeout_secs),
        ("monitor.poll_interval_secs", monitor.poll_interval_secs),
        ("monitor.shutdown_grace_secs", monitor.shutdown_grace_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    if monitor.timeout_secs > 0 && monitor.poll_interval_secs > monitor.timeout_secs {
        errors.push(ValidationError::PollIntervalExceedsTimeout {
            poll: monitor.poll_interval_secs,
            timeout: monitor.timeout_secs,
        });
    }

    if config.heartbeat.enabled {
        check_address(&mut errors, "heartbeat.bind_address", &config.heartbeat.bind_address);
    }
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.destination.command.trim().is_empty() {
        errors.push(ValidationError::MissingCommand);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> WorkerConfig {
        let mut config = WorkerConfig::default();
        config.destination.command = "cat".into();
        config
    }

    #[test]
    fn test_valid_config() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.monitor.timeout_secs = 0;
        config.monitor.shutdown_grace_secs = 0;
        config.heartbeat.bind_address = "not-an-address".into();
        config.destination.command = "  ".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::Zero {
            field: "monitor.timeout_secs"
        }));
        assert!(errors.contains(&ValidationError::MissingCommand));
    }

    #[test]
    fn test_poll_interval_bounded_by_timeout() {
        let mut config = valid();
        config.monitor.timeout_secs = 5;
        config.monitor.poll_interval_secs = 10;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::PollIntervalExceedsTimeout {
                poll: 10,
                timeout: 5
            }]
        );
    }

    #[test]
    fn test_disabled_listeners_are_not_checked() {
        let mut config = valid();
        config.heartbeat.enabled = false;
        config.heartbeat.bind_address = String::new();
        config.observability.metrics_address = String::new();
        assert_eq!(validate_config(&config), Ok(()));
    }
}
