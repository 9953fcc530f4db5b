//! Destination watchdog worker (v1)
//!
//! Streams newline-delimited records from stdin into a destination process
//! while a timeout monitor watches every write and the final end-of-input.
//!
//! # Architecture Overview
//!
//! ```text
//!   stdin ──▶ TimedDestination ──▶ destination process (stdin pipe)
//!                   │
//!          start/reset timers
//!                   ▼
//!            TimeoutMonitor ◀── ConfigPolicy ◀── hot-reloaded worker.toml
//!                   │
//!        breach ──▶ metrics (Prometheus) + logs
//!
//!   heartbeat server (GET /)        signals ──▶ Shutdown
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;

use destination_watchdog::config::{load_config, ConfigWatcher, SharedConfig, WorkerConfig};
use destination_watchdog::destination::{
    Destination, DestinationError, ProcessDestination, TimedDestination,
};
use destination_watchdog::heartbeat;
use destination_watchdog::lifecycle::{signals, Shutdown};
use destination_watchdog::monitor::{Completion, ConfigPolicy, TimeoutMonitor};
use destination_watchdog::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "destination-watchdog", version, about)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "worker.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stream stdin into the destination under timeout supervision
    Run,
    /// Validate the config and print the resolved settings
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Check => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Run => run(&cli.config, config).await,
    }
}

async fn run(path: &Path, config: WorkerConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = logging::init_logging(&config.observability) {
        eprintln!("failed to initialize logging: {}", e);
    }

    tracing::info!(
        workspace_id = %config.connection.workspace_id,
        connection_id = %config.connection.connection_id,
        timeout_secs = config.monitor.timeout_secs,
        poll_interval_secs = config.monitor.poll_interval_secs,
        fail_on_timeout = config.monitor.fail_on_timeout,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_signal_handler(shutdown.clone());

    let shared: SharedConfig = Arc::new(ArcSwap::from_pointee(config.clone()));
    let _watcher = match ConfigWatcher::new(path, shared.clone()).run() {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            tracing::warn!(error = %e, "Config hot reload disabled");
            None
        }
    };

    let heartbeat = if config.heartbeat.enabled {
        let listener = TcpListener::bind(&config.heartbeat.bind_address).await?;
        Some(tokio::spawn(heartbeat::serve(listener, shutdown.subscribe())))
    } else {
        None
    };

    let monitor = TimeoutMonitor::new(
        config.watchdog(),
        Arc::new(ConfigPolicy::new(shared)),
        Arc::new(metrics::GlobalMetrics),
    )
    .with_shutdown(shutdown.subscribe());

    let destination = ProcessDestination::spawn(&config.destination)?;
    let outcome = monitor
        .supervise(stream_stdin(TimedDestination::new(destination, &monitor)))
        .await;

    monitor.shutdown().await;
    shutdown.trigger();
    if let Some(heartbeat) = heartbeat {
        match heartbeat.await {
            Ok(Err(e)) => tracing::warn!(error = %e, "Heartbeat server failed"),
            Err(e) => tracing::warn!(error = %e, "Heartbeat task failed"),
            Ok(Ok(())) => {}
        }
    }

    match outcome {
        Ok(Completion::Finished(records)) => {
            tracing::info!(records, "Destination finished");
            Ok(())
        }
        Ok(Completion::Interrupted) => {
            tracing::info!("Stopped before the destination finished");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Destination run failed");
            Err(e.into())
        }
    }
}

async fn stream_stdin<D: Destination>(
    mut destination: TimedDestination<'_, D>,
) -> Result<u64, DestinationError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        destination.accept(line.as_bytes()).await?;
    }
    destination.notify_end_of_input().await?;
    Ok(destination.accepted())
}
