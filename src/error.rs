//! Error types
//!
//! Centralized error handling using thiserror. Every error in this crate is
//! non-fatal to the hosting session: the binary absorbs them all, logging at
//! most a warning. `Result` exists for internal plumbing, not for surfacing
//! failures to the host.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for tracker-notify
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("failed to read config file '{path}': {reason}")]
    ConfigRead { path: PathBuf, reason: String },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("host API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for tracker-notify operations
pub type Result<T> = std::result::Result<T, PluginError>;
