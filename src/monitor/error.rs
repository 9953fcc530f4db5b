//! Supervision outcomes and errors.

use std::time::Duration;
use thiserror::Error;

use crate::monitor::humanize::format_duration;
use crate::monitor::Phase;

/// A phase stalled past the timeout and the policy made it fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Last action {human_readable_elapsed} ago, exceeding the threshold of {human_readable_threshold}.")]
pub struct TimeoutError {
    pub phase: Phase,
    pub threshold: Duration,
    pub elapsed: Duration,
    pub human_readable_threshold: String,
    pub human_readable_elapsed: String,
}

impl TimeoutError {
    pub fn new(phase: Phase, threshold: Duration, elapsed: Duration) -> Self {
        Self {
            phase,
            threshold,
            elapsed,
            human_readable_threshold: format_duration(threshold),
            human_readable_elapsed: format_duration(elapsed),
        }
    }
}

/// Failure of a supervised run.
///
/// `E` is the primary task's own error type and is never rewritten.
#[derive(Debug, Error)]
pub enum SupervisionError<E> {
    #[error(transparent)]
    Timeout(TimeoutError),

    #[error(transparent)]
    Primary(E),
}

impl<E> SupervisionError<E> {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SupervisionError::Timeout(_))
    }

    /// The primary task's error, if that is what this is.
    pub fn into_primary(self) -> Option<E> {
        match self {
            SupervisionError::Primary(e) => Some(e),
            SupervisionError::Timeout(_) => None,
        }
    }
}

/// A supervised run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<T> {
    /// The primary task finished with this value.
    Finished(T),
    /// Host shutdown interrupted the wait; the primary task was abandoned.
    Interrupted,
}

impl<T> Completion<T> {
    pub fn finished(self) -> Option<T> {
        match self {
            Completion::Finished(value) => Some(value),
            Completion::Interrupted => None,
        }
    }
}
