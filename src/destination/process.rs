//! Destination backed by a child process reading newline-delimited records
//! from stdin.

use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};

use crate::config::DestinationConfig;
use crate::destination::{Destination, DestinationError};

pub struct ProcessDestination {
    child: Child,
    stdin: Option<ChildStdin>,
}

impl ProcessDestination {
    /// Spawn the configured command with a piped stdin.
    ///
    /// The child's stdout and stderr are inherited.
    pub fn spawn(config: &DestinationConfig) -> Result<Self, DestinationError> {
        let mut child = Command::new(&config.command)
            .args(&config.args)
            .stdin(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DestinationError::Spawn {
                command: config.command.clone(),
                source,
            })?;
        let stdin = child.stdin.take();

        tracing::info!(command = %config.command, pid = ?child.id(), "Destination started");
        Ok(Self { child, stdin })
    }
}

impl Destination for ProcessDestination {
    async fn accept(&mut self, record: &[u8]) -> Result<(), DestinationError> {
        let stdin = self.stdin.as_mut().ok_or(DestinationError::InputClosed)?;
        stdin.write_all(record).await?;
        if !record.ends_with(b"\n") {
            stdin.write_all(b"\n").await?;
        }
        Ok(())
    }

    async fn notify_end_of_input(&mut self) -> Result<(), DestinationError> {
        let mut stdin = self.stdin.take().ok_or(DestinationError::InputClosed)?;
        stdin.flush().await?;
        drop(stdin);

        let status = self.child.wait().await?;
        tracing::info!(status = %status, "Destination exited");
        if status.success() {
            Ok(())
        } else {
            Err(DestinationError::Exited(status))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn config(command: &str, args: &[&str]) -> DestinationConfig {
        DestinationConfig {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_streams_records_and_waits_for_exit() {
        let mut destination = ProcessDestination::spawn(&config("sh", &["-c", "cat > /dev/null"])).unwrap();
        destination.accept(b"{\"id\":1}").await.unwrap();
        destination.accept(b"{\"id\":2}\n").await.unwrap();
        destination.notify_end_of_input().await.unwrap();

        let err = destination.accept(b"late").await.unwrap_err();
        assert!(matches!(err, DestinationError::InputClosed));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        let mut destination = ProcessDestination::spawn(&config("sh", &["-c", "cat > /dev/null; exit 3"])).unwrap();
        let err = destination.notify_end_of_input().await.unwrap_err();
        assert!(matches!(err, DestinationError::Exited(status) if status.code() == Some(3)));
    }

    #[tokio::test]
    async fn test_missing_command() {
        let result = ProcessDestination::spawn(&config("/nonexistent/destination", &[]));
        assert!(matches!(result, Err(DestinationError::Spawn { .. })));
    }
}
