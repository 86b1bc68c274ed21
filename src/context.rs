//! tmux context resolution
//!
//! Resolves the session/window/pane triple for the pane hosting the agent,
//! once at startup. Tracker commands are scoped to this triple so that
//! multiple panes can report to one tracker instance without clobbering
//! each other. Resolution failure degrades to the raw pane token rather
//! than disabling the plugin.

use std::time::Duration;
use tokio::process::Command;

/// How long to wait for `tmux display-message` before giving up.
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(2);

/// Separator used in the tmux format string to make splitting unambiguous.
const FIELD_SEPARATOR: &str = ":::";

/// Resolved tmux identity for the hosting pane.
///
/// `session_id` and `window_id` are absent in the degraded form, where only
/// the externally supplied pane token is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmuxContext {
    pub session_id: Option<String>,
    pub window_id: Option<String>,
    pub pane_id: String,
}

impl TmuxContext {
    /// Fallback identity carrying only the raw pane token.
    pub fn degraded(pane: &str) -> Self {
        Self {
            session_id: None,
            window_id: None,
            pane_id: pane.to_string(),
        }
    }

    /// Query tmux for the full session/window/pane triple of `pane`.
    ///
    /// Any failure mode (tmux missing, timeout, non-zero exit, malformed
    /// output) yields the degraded context. The result is resolved once and
    /// cached by ownership for the process lifetime.
    pub async fn resolve(pane: &str) -> Self {
        let format = format!(
            "#{{session_id}}{sep}#{{window_id}}{sep}#{{pane_id}}",
            sep = FIELD_SEPARATOR
        );
        let query = Command::new("tmux")
            .args(["display-message", "-p", "-t", pane, &format])
            .output();

        let output = match tokio::time::timeout(RESOLVE_TIMEOUT, query).await {
            Ok(Ok(output)) if output.status.success() => output,
            Ok(Ok(output)) => {
                tracing::debug!(status = ?output.status, "tmux display-message failed");
                return Self::degraded(pane);
            }
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "failed to spawn tmux");
                return Self::degraded(pane);
            }
            Err(_) => {
                tracing::debug!("tmux display-message timed out");
                return Self::degraded(pane);
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        match Self::parse_triple(stdout.trim()) {
            Some(ctx) => ctx,
            None => {
                tracing::debug!(output = %stdout.trim(), "malformed tmux context output");
                Self::degraded(pane)
            }
        }
    }

    /// Parse the `session:::window:::pane` triple printed by tmux.
    fn parse_triple(output: &str) -> Option<Self> {
        let parts: Vec<&str> = output.split(FIELD_SEPARATOR).collect();
        let [session, window, pane] = parts.as_slice() else {
            return None;
        };
        if pane.is_empty() {
            return None;
        }
        Some(Self {
            session_id: Some(session.to_string()),
            window_id: Some(window.to_string()),
            pane_id: pane.to_string(),
        })
    }

    /// Build the tracker client's scoping arguments from this context.
    ///
    /// Flags are emitted only for fields that resolved; the degraded form
    /// yields just `-pane <token>`.
    pub fn tracker_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(session) = &self.session_id {
            args.push("-session-id".to_string());
            args.push(session.clone());
        }
        if let Some(window) = &self.window_id {
            args.push("-window-id".to_string());
            args.push(window.clone());
        }
        args.push("-pane".to_string());
        args.push(self.pane_id.clone());
        args
    }
}
