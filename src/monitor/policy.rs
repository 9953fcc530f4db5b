//! Timeout policy gate.
//!
//! Decides, at the moment a breach is detected, whether the breach fails the
//! supervised run. Implementations are asked once per breach and must not
//! cache the answer across runs.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::WorkerConfig;

/// Answers "should this breach be fatal right now".
pub trait TimeoutPolicy: Send + Sync {
    fn is_fatal(&self) -> bool;
}

impl<F> TimeoutPolicy for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_fatal(&self) -> bool {
        self()
    }
}

/// Policy fixed when the monitor is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPolicy(pub bool);

impl TimeoutPolicy for FixedPolicy {
    fn is_fatal(&self) -> bool {
        self.0
    }
}

/// Policy read from the live, hot-reloaded worker configuration.
#[derive(Clone)]
pub struct ConfigPolicy {
    config: Arc<ArcSwap<WorkerConfig>>,
}

impl ConfigPolicy {
    pub fn new(config: Arc<ArcSwap<WorkerConfig>>) -> Self {
        Self { config }
    }
}

impl TimeoutPolicy for ConfigPolicy {
    fn is_fatal(&self) -> bool {
        self.config.load().monitor.fail_on_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_closure_policy_is_re_evaluated() {
        let flag = Arc::new(AtomicBool::new(false));
        let f = flag.clone();
        let policy = move || f.load(Ordering::SeqCst);
        assert!(!policy.is_fatal());
        flag.store(true, Ordering::SeqCst);
        assert!(policy.is_fatal());
    }

    #[test]
    fn test_config_policy_follows_swaps() {
        let shared = Arc::new(ArcSwap::from_pointee(WorkerConfig::default()));
        let policy = ConfigPolicy::new(shared.clone());
        assert!(!policy.is_fatal());

        let mut updated = WorkerConfig::default();
        updated.monitor.fail_on_timeout = true;
        shared.store(Arc::new(updated));
        assert!(policy.is_fatal());
    }

    #[test]
    fn test_fixed_policy() {
        assert!(FixedPolicy(true).is_fatal());
        assert!(!FixedPolicy(false).is_fatal());
    }
}
