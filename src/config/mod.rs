//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → WorkerConfig (validated, immutable)
//!     → shared via Arc<ArcSwap<_>> to readers
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of the shared WorkerConfig
//!     → the timeout policy sees the new fail_on_timeout at the next breach
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Only the timeout policy reads the live config; timers and intervals are
//!   fixed when a monitor is built

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ConnectionConfig, DestinationConfig, HeartbeatConfig, LogFormat, MonitorConfig,
    ObservabilityConfig, WorkerConfig,
};
pub use watcher::{ConfigWatcher, SharedConfig};
