//! Error taxonomy for the dashboard.
//!
//! Only the two startup errors ([`PockerError::EngineUnavailable`] and
//! [`PockerError::NoVisibleContainers`]) stop the application. Everything else is
//! recovered inside the loop that produced it and surfaces as a notification.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, PockerError>;

#[derive(Debug, Error)]
pub enum PockerError {
    /// The engine cannot be reached at all (daemon not running, socket missing).
    #[error("container engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The engine answered, but nothing matches the visibility filter.
    #[error("no container(s) to display ({hidden} stopped container(s) hidden)")]
    NoVisibleContainers { hidden: usize, config_path: PathBuf },

    /// A one-off engine call failed, usually because the container vanished.
    #[error("{operation} failed for {target}: {reason}")]
    EngineOperationFailed {
        operation: &'static str,
        target: String,
        reason: String,
    },

    /// An event or log stream ended unexpectedly.
    #[error("stream disconnected: {0}")]
    StreamDisconnected(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("config write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}

impl PockerError {
    pub fn operation_failed(
        operation: &'static str,
        target: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        PockerError::EngineOperationFailed {
            operation,
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// True for the errors that halt the application at startup.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PockerError::EngineUnavailable(_) | PockerError::NoVisibleContainers { .. }
        )
    }

    /// Short reason line for the startup error screen.
    pub fn reason(&self) -> String {
        match self {
            PockerError::EngineUnavailable(_) => "Container engine is not reachable".to_string(),
            PockerError::NoVisibleContainers { .. } => "No container(s) to display".to_string(),
            other => other.to_string(),
        }
    }

    /// Help text shown under the reason on the startup error screen.
    pub fn help(&self) -> Vec<String> {
        match self {
            PockerError::EngineUnavailable(detail) => vec![
                "- Make sure the Docker daemon is running.".to_string(),
                "- Check that your user can access the Docker socket.".to_string(),
                format!("- Engine said: {}", detail),
            ],
            PockerError::NoVisibleContainers { hidden, config_path } => {
                let mut lines = vec!["- No containers are running.".to_string()];
                if *hidden > 0 {
                    lines.push(format!(
                        "- {} stopped container(s) are hidden by the visibility filter.",
                        hidden
                    ));
                }
                lines.push(
                    "- Set `show_all_containers = true` in config to display exited containers."
                        .to_string(),
                );
                lines.push(format!("Config can be found at `{}`", config_path.display()));
                lines
            }
            _ => Vec::new(),
        }
    }
}
