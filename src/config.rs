//! Configuration management
//!
//! Loads configuration from `~/.config/tracker-notify/config.toml` when
//! present, falling back to built-in defaults field by field. Paths may use
//! `~`, expanded at point of use.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PluginError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginConfig {
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tracker client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Path to the tracker client binary; `~` is expanded.
    #[serde(default = "default_tracker_bin")]
    pub bin: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            bin: default_tracker_bin(),
        }
    }
}

impl TrackerConfig {
    pub fn expanded_bin(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.bin).into_owned())
    }
}

/// Notifier process settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Program invoked with the serialized payload as its last argument.
    #[serde(default = "default_notifier_program")]
    pub program: String,
    /// Leading arguments placed before the payload (e.g. a script path).
    #[serde(default = "default_notifier_args")]
    pub args: Vec<String>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            program: default_notifier_program(),
            args: default_notifier_args(),
        }
    }
}

impl NotifierConfig {
    pub fn expanded_program(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.program).into_owned())
    }
}

/// Host runtime API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the host server exposing session messages.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Optional project directory forwarded as a query parameter.
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            directory: None,
        }
    }
}

/// Message fetch retry policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retry_attempts")]
    pub attempts: u32,
    #[serde(default = "default_retry_pause_ms")]
    pub pause_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_retry_attempts(),
            pause_ms: default_retry_pause_ms(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable file output with daily rotation.
    #[serde(default)]
    pub file_output: bool,
    /// Log file directory; defaults to the platform data dir.
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: false,
            file_path: None,
        }
    }
}

fn default_tracker_bin() -> String {
    "~/.config/agent-tracker/bin/tracker-client".to_string()
}

fn default_notifier_program() -> String {
    "/usr/bin/python3".to_string()
}

fn default_notifier_args() -> Vec<String> {
    vec!["~/.config/codex/notify.py".to_string()]
}

fn default_base_url() -> String {
    "http://127.0.0.1:4096".to_string()
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_pause_ms() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

impl PluginConfig {
    /// Default user config path: `~/.config/tracker-notify/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tracker-notify")
            .join("config.toml")
    }

    /// Load configuration from the default path, or defaults if absent.
    pub fn load() -> Self {
        let path = Self::default_path();
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(PluginError::ConfigRead { .. }) => Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, ?path, "invalid config file, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| PluginError::ConfigRead {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(toml::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = PluginConfig::default();
        assert_eq!(config.retry.attempts, 3);
        assert_eq!(config.retry.pause_ms, 100);
        assert_eq!(config.api.base_url, "http://127.0.0.1:4096");
        assert!(config.api.directory.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.file_output);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: PluginConfig = toml::from_str(
            r#"
            [tracker]
            bin = "/opt/tracker/bin/tracker-client"

            [retry]
            attempts = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.tracker.bin, "/opt/tracker/bin/tracker-client");
        assert_eq!(config.retry.attempts, 5);
        assert_eq!(config.retry.pause_ms, 100);
        assert_eq!(config.notifier.program, "/usr/bin/python3");
    }

    #[test]
    fn test_tilde_expansion() {
        let tracker = TrackerConfig::default();
        let expanded = tracker.expanded_bin();
        assert!(!expanded.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = PathBuf::from("/nonexistent/tracker-notify/config.toml");
        assert!(matches!(
            PluginConfig::load_from(&path),
            Err(PluginError::ConfigRead { .. })
        ));
    }

    #[test]
    fn test_load_from_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = PluginConfig::default();
        config.api.directory = Some("/home/dev/project".to_string());
        std::fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

        let loaded = PluginConfig::load_from(&path).unwrap();
        assert_eq!(loaded.api.directory.as_deref(), Some("/home/dev/project"));
    }
}
