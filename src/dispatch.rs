//! External command dispatch
//!
//! Fire-and-forget invocations of the two external collaborators: the
//! tracker client (task start/finish records) and the notifier (desktop
//! alert on turn completion). The [`Dispatcher`] contract is that failures
//! are swallowed here and never reach the hosting session; callers are free
//! to ignore the outcome entirely.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use tokio::process::Command;

use crate::config::{NotifierConfig, TrackerConfig};
use crate::context::TmuxContext;
use crate::probe;

/// Task lifecycle action reported to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Start,
    Finish,
}

impl TaskAction {
    /// Command verb understood by the tracker client.
    pub fn verb(self) -> &'static str {
        match self {
            TaskAction::Start => "start_task",
            TaskAction::Finish => "finish_task",
        }
    }
}

/// Payload handed to the notifier when a turn completes.
#[derive(Debug, Clone, Serialize)]
pub struct TurnNotification {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "last-assistant-message")]
    pub last_assistant_message: String,
    pub input_messages: Vec<String>,
}

impl TurnNotification {
    pub fn new(last_assistant_message: String, input_messages: Vec<String>) -> Self {
        Self {
            kind: "agent-turn-complete",
            last_assistant_message,
            input_messages,
        }
    }
}

/// Outbound dispatch capability.
///
/// Both methods are best-effort: implementations absorb every failure and
/// return nothing, keeping the never-propagate policy in the interface
/// rather than in scattered suppression at call sites.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Record a task start or finish with the tracker.
    async fn dispatch_task(&self, action: TaskAction, summary: &str, ctx: &TmuxContext);

    /// Surface a turn-complete notification.
    async fn dispatch_notification(&self, payload: &TurnNotification);
}

/// Build the tracker client argv tail for one dispatch.
fn tracker_command_args(action: TaskAction, summary: &str, ctx: &TmuxContext) -> Vec<String> {
    let mut args = vec!["command".to_string()];
    args.extend(ctx.tracker_args());
    args.push("-summary".to_string());
    args.push(summary.to_string());
    args.push(action.verb().to_string());
    args
}

/// [`Dispatcher`] that spawns the configured external processes.
pub struct ProcessDispatcher {
    tracker_bin: PathBuf,
    notifier_program: PathBuf,
    notifier_args: Vec<String>,
}

impl ProcessDispatcher {
    pub fn new(tracker: &TrackerConfig, notifier: &NotifierConfig) -> Self {
        Self {
            tracker_bin: tracker.expanded_bin(),
            notifier_program: notifier.expanded_program(),
            notifier_args: notifier.args.clone(),
        }
    }
}

#[async_trait]
impl Dispatcher for ProcessDispatcher {
    async fn dispatch_task(&self, action: TaskAction, summary: &str, ctx: &TmuxContext) {
        if !probe::tracker_ready(&self.tracker_bin) {
            tracing::debug!(action = action.verb(), "tracker not ready, skipping dispatch");
            return;
        }
        let args = tracker_command_args(action, summary, ctx);
        tracing::debug!(action = action.verb(), summary, "dispatching task command");
        match Command::new(&self.tracker_bin).args(&args).status().await {
            Ok(status) if !status.success() => {
                tracing::debug!(?status, action = action.verb(), "tracker exited non-zero");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, action = action.verb(), "failed to spawn tracker");
            }
        }
    }

    async fn dispatch_notification(&self, payload: &TurnNotification) {
        let serialized = match serde_json::to_string(payload) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize notification payload");
                return;
            }
        };
        let result = Command::new(&self.notifier_program)
            .args(&self.notifier_args)
            .arg(&serialized)
            .status()
            .await;
        match result {
            Ok(status) if !status.success() => {
                tracing::debug!(?status, "notifier exited non-zero");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "failed to spawn notifier");
            }
        }
    }
}
