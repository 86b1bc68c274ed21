//! Logging system initialization
//!
//! Uses the tracing ecosystem for structured logging with support for:
//! - Environment variable override (TRACKER_NOTIFY_LOG)
//! - Console output on stderr (stdout carries the event stream)
//! - Optional file output with daily rotation

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// Get the default log directory path
fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tracker-notify")
        .join("logs")
}

/// Initialize the logging system
///
/// # Environment Variables
/// - `TRACKER_NOTIFY_LOG`: Override log level
///   (e.g. "tracker_notify=debug,tracker_notify::lifecycle=trace")
pub fn init_logging(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_env("TRACKER_NOTIFY_LOG").unwrap_or_else(|_| {
        EnvFilter::new(format!("tracker_notify={}", config.level.to_lowercase()))
    });

    // Console output goes to stderr: stdout is the host's event channel.
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(true);

    let file_layer = if config.file_output {
        let log_dir = config.file_path.clone().unwrap_or_else(default_log_dir);
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            eprintln!("Warning: failed to create log directory {log_dir:?}: {e}");
            None
        } else {
            let file_appender =
                RollingFileAppender::new(Rotation::DAILY, &log_dir, "tracker-notify.log");
            let file_layer = fmt::layer()
                .with_writer(file_appender)
                .with_target(true)
                .with_level(true)
                .with_ansi(false);
            Some(file_layer.boxed())
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::debug!(
        level = %config.level,
        file_output = config.file_output,
        "logging initialized"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_dir_is_namespaced() {
        let dir = default_log_dir();
        assert!(dir.to_string_lossy().contains("tracker-notify"));
    }
}
