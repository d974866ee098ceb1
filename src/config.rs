//! Config file loading. Read once at startup, never hot-reloaded.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PockerError, Result};

/// How the log pane follows new output after the initial snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    /// Re-fetch with `since=<last fetch>` on a fixed interval.
    #[default]
    Poll,
    /// Hold one streaming read open for the selected container.
    Follow,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_tail: usize,
    pub max_log_lines: usize,
    pub show_all_containers: bool,
    pub stats_poll_interval_secs: f64,
    pub log_poll_interval_ms: u64,
    pub log_mode: LogMode,
    pub event_resubscribe_attempts: u32,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_tail: 2000,
            max_log_lines: 2000,
            show_all_containers: false,
            stats_poll_interval_secs: 1.0,
            log_poll_interval_ms: 1000,
            log_mode: LogMode::Poll,
            event_resubscribe_attempts: 5,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load the config at `path`, writing the defaults there first if the file
    /// does not exist yet.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Config::default();
            config.save(path)?;
            return Ok(config);
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.stats_poll_interval_secs <= 0.0 || !self.stats_poll_interval_secs.is_finite() {
            return Err(PockerError::Config(format!(
                "stats_poll_interval_secs must be a positive number, got {}",
                self.stats_poll_interval_secs
            )));
        }
        if self.log_poll_interval_ms == 0 {
            return Err(PockerError::Config("log_poll_interval_ms must be > 0".into()));
        }
        if self.max_log_lines == 0 {
            return Err(PockerError::Config("max_log_lines must be > 0".into()));
        }
        Ok(())
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs_f64(self.stats_poll_interval_secs)
    }

    pub fn log_poll_interval(&self) -> Duration {
        Duration::from_millis(self.log_poll_interval_ms)
    }
}

/// `~/.config/pocker` on Linux, the platform equivalent elsewhere.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pocker")
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Directory for the rolling log file.
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("pocker")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_or_create(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let reloaded = Config::load_or_create(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let config = Config::from_toml("show_all_containers = true\nlog_mode = \"follow\"\n").unwrap();
        assert!(config.show_all_containers);
        assert_eq!(config.log_mode, LogMode::Follow);
        assert_eq!(config.log_tail, 2000);
        assert_eq!(config.stats_interval(), Duration::from_secs(1));
    }

    #[test]
    fn non_positive_intervals_are_rejected() {
        let err = Config::from_toml("stats_poll_interval_secs = 0.0").unwrap_err();
        assert!(matches!(err, PockerError::Config(_)));

        let err = Config::from_toml("log_poll_interval_ms = 0").unwrap_err();
        assert!(matches!(err, PockerError::Config(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::from_toml("log_tail = \"lots\"").unwrap_err();
        assert!(matches!(err, PockerError::Toml(_)));
    }
}
