//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::loader::load_config;
use crate::config::schema::WorkerConfig;

/// Live configuration shared with every reader.
pub type SharedConfig = Arc<ArcSwap<WorkerConfig>>;

/// A watcher that reloads the configuration file into a [`SharedConfig`].
pub struct ConfigWatcher {
    path: PathBuf,
    shared: SharedConfig,
}

impl ConfigWatcher {
    pub fn new(path: &Path, shared: SharedConfig) -> Self {
        Self {
            path: path.to_path_buf(),
            shared,
        }
    }

    /// Reload the file now. Invalid files leave the current config in place.
    pub fn reload(&self) -> bool {
        reload_into(&self.path, &self.shared)
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for reloads to continue.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let shared = self.shared.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Config file change detected, reloading...");
                        reload_into(&path, &shared);
                    }
                }
                Err(e) => tracing::error!(error = %e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

fn reload_into(path: &Path, shared: &SharedConfig) -> bool {
    match load_config(path) {
        Ok(config) => {
            tracing::info!(
                fail_on_timeout = config.monitor.fail_on_timeout,
                "Configuration reloaded"
            );
            shared.store(Arc::new(config));
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to reload config. Keeping current configuration.");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_reload_swaps_valid_and_keeps_on_invalid() {
        let path = std::env::temp_dir().join(format!("dw-watcher-{}.toml", uuid::Uuid::new_v4()));
        let mut initial = WorkerConfig::default();
        initial.destination.command = "cat".into();
        let shared: SharedConfig = Arc::new(ArcSwap::from_pointee(initial));
        let watcher = ConfigWatcher::new(&path, shared.clone());

        fs::write(
            &path,
            "[monitor]\nfail_on_timeout = true\n\n[destination]\ncommand = \"cat\"\n",
        )
        .unwrap();
        assert!(watcher.reload());
        assert!(shared.load().monitor.fail_on_timeout);

        fs::write(&path, "[monitor]\ntimeout_secs = 0\n").unwrap();
        assert!(!watcher.reload());
        assert!(shared.load().monitor.fail_on_timeout);
        assert_eq!(shared.load().monitor.timeout_secs, 7200);

        let _ = fs::remove_file(&path);
    }
}
