//! Task lifecycle state machine
//!
//! Converts the host's redundant, unordered completion signals into exactly
//! one start and at most one finish dispatch per task. Three independent
//! sources can report the same turn boundary (status polling, explicit idle
//! events, assistant message completion); the guards here are the sole
//! dedupe mechanism, so every guard is checked and flipped before the first
//! await of a transition.
//!
//! All state is owned by the [`TaskTracker`] instance rather than living in
//! module globals, so tests can run isolated instances side by side.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::config::RetryConfig;
use crate::context::TmuxContext;
use crate::dispatch::{Dispatcher, TaskAction, TurnNotification};
use crate::events::{HostEvent, SessionStatus};
use crate::fetch::{last_message_of_role, Message, MessageSource};
use crate::summary::{
    summarize, truncate_chars, MessagePart, Role, NOTIFY_SUMMARY_MAX, TASK_LABEL_MAX,
};

/// Label used when no user text could be resolved for a start.
const START_PLACEHOLDER: &str = "working...";

/// Label used when no assistant text could be resolved for a finish.
const FINISH_PLACEHOLDER: &str = "done";

/// Label for the startup finish that clears an orphaned open task.
const STALE_LABEL: &str = "stale";

/// How many trailing user messages a turn notification carries.
const NOTIFY_INPUT_MESSAGES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TaskState {
    #[default]
    Idle,
    Active,
}

/// Per-session lifecycle state.
///
/// Created on the first event naming the session, destroyed only with the
/// tracker instance. Bounded by the number of concurrently open sessions.
#[derive(Debug, Default)]
struct SessionState {
    state: TaskState,
    /// Most recently captured user input, consumed by the next start.
    pending_user_text: Option<String>,
}

/// Role and owning session of a message, learned from `message.updated`.
#[derive(Debug, Clone)]
struct MessageMeta {
    role: Role,
    session_id: String,
}

/// Per-instance task lifecycle tracker.
pub struct TaskTracker<D, S> {
    ctx: TmuxContext,
    dispatcher: D,
    source: S,
    retry_attempts: u32,
    retry_pause: Duration,
    sessions: HashMap<String, SessionState>,
    messages: HashMap<String, MessageMeta>,
    /// Text from parts whose message is not yet announced. Only captured
    /// while no session is active, since user input precedes the task.
    unattributed_text: Option<String>,
    /// Sessions whose current task already dispatched its finish. A start
    /// re-arms its session by removing it, so membership always refers to
    /// the session's current task.
    finished: HashSet<String>,
}

impl<D: Dispatcher, S: MessageSource> TaskTracker<D, S> {
    pub fn new(ctx: TmuxContext, dispatcher: D, source: S, retry: &RetryConfig) -> Self {
        Self {
            ctx,
            dispatcher,
            source,
            retry_attempts: retry.attempts.max(1),
            retry_pause: Duration::from_millis(retry.pause_ms),
            sessions: HashMap::new(),
            messages: HashMap::new(),
            unattributed_text: None,
            finished: HashSet::new(),
        }
    }

    /// Clear any task left open for this pane by an abrupt prior exit.
    ///
    /// Dispatched unconditionally before any event is processed; the
    /// tracker treats it as a no-op when nothing is open for the pane.
    pub async fn reconcile_startup(&self) {
        tracing::debug!("reconciling startup, finishing any stale task");
        self.dispatcher
            .dispatch_task(TaskAction::Finish, STALE_LABEL, &self.ctx)
            .await;
    }

    /// Handle one classified host event to completion.
    pub async fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::SessionStatus { session_id, status } => match status {
                SessionStatus::Busy => self.start_task(&session_id).await,
                SessionStatus::Idle => self.finish_task(&session_id).await,
            },
            HostEvent::SessionIdle { session_id } => self.finish_task(&session_id).await,
            HostEvent::MessageUpdated {
                message_id,
                role,
                session_id,
                completed,
            } => {
                self.messages.insert(
                    message_id,
                    MessageMeta {
                        role,
                        session_id: session_id.clone(),
                    },
                );
                // A completed assistant message is a finish signal in its
                // own right; status events for the same turn may be delayed
                // or dropped.
                if role == Role::Assistant && completed.is_some() {
                    self.finish_task(&session_id).await;
                }
            }
            HostEvent::MessagePartUpdated { part } => self.capture_part(part),
            HostEvent::ChatSubmitted {
                role,
                session_id,
                parts,
            } => {
                if role == Role::User {
                    let text = summarize(&parts, NOTIFY_SUMMARY_MAX);
                    if !text.is_empty() {
                        self.sessions
                            .entry(session_id.clone())
                            .or_default()
                            .pending_user_text = Some(text);
                    }
                    self.start_task(&session_id).await;
                }
            }
            HostEvent::Ignored => {}
        }
    }

    /// Capture streaming text from a part update.
    ///
    /// Parts carry no session id; attribution goes through the message
    /// metadata map. Parts of not-yet-announced messages are kept in the
    /// unattributed buffer only while no task is active.
    fn capture_part(&mut self, part: MessagePart) {
        if part.kind != "text" || part.ignored {
            return;
        }
        let Some(text) = part.text.as_deref() else {
            return;
        };
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let text = truncate_chars(text, NOTIFY_SUMMARY_MAX);
        match part.message_id.as_deref().and_then(|id| self.messages.get(id)) {
            Some(meta) if meta.role == Role::User => {
                let session_id = meta.session_id.clone();
                self.sessions
                    .entry(session_id)
                    .or_default()
                    .pending_user_text = Some(text);
            }
            Some(_) => {}
            None => {
                if !self.any_active() {
                    self.unattributed_text = Some(text);
                }
            }
        }
    }

    fn any_active(&self) -> bool {
        self.sessions
            .values()
            .any(|s| s.state == TaskState::Active)
    }

    /// Idle -> Active transition; fires at most once per edge.
    async fn start_task(&mut self, session_id: &str) {
        let state = self.sessions.entry(session_id.to_string()).or_default();
        if state.state == TaskState::Active {
            return;
        }
        // Flip the guard and re-arm the finished-set before the first
        // await; a second busy signal arriving behind this one must see
        // Active.
        state.state = TaskState::Active;
        let pending = state.pending_user_text.take();
        // Drained on every start, whether consumed or not: a fragment
        // buffered before this task must not label a later session's task.
        let buffered = self.unattributed_text.take();
        self.finished.remove(session_id);

        let mut text = pending.or(buffered).unwrap_or_default();
        if text.is_empty() {
            text = self.fetch_last_text(session_id, Role::User).await;
        }
        let label = if text.is_empty() {
            START_PLACEHOLDER.to_string()
        } else {
            truncate_chars(&text, TASK_LABEL_MAX)
        };
        tracing::info!(session = session_id, label = %label, "task started");
        self.dispatcher
            .dispatch_task(TaskAction::Start, &label, &self.ctx)
            .await;
    }

    /// Active -> Idle transition; idempotent across redundant signals.
    async fn finish_task(&mut self, session_id: &str) {
        let Some(state) = self.sessions.get_mut(session_id) else {
            // Finish for a session that never started here: either a
            // different session owns the current task or the signal is
            // stray. Dropped either way.
            return;
        };
        if state.state != TaskState::Active {
            return;
        }
        if self.finished.contains(session_id) {
            return;
        }
        // Both guards flip before the first await so a second completion
        // signal cannot also observe "not yet finished".
        state.state = TaskState::Idle;
        self.finished.insert(session_id.to_string());

        let text = self.fetch_last_text(session_id, Role::Assistant).await;
        let label = if text.is_empty() {
            FINISH_PLACEHOLDER.to_string()
        } else {
            truncate_chars(&text, TASK_LABEL_MAX)
        };
        tracing::info!(session = session_id, label = %label, "task finished");
        self.dispatcher
            .dispatch_task(TaskAction::Finish, &label, &self.ctx)
            .await;

        // Best-effort, independent of the tracker dispatch outcome.
        self.notify_turn_complete(session_id).await;
    }

    /// Retrying read of the last message text for `role`.
    ///
    /// Up to `retry_attempts` fetches with a pause between attempts; first
    /// non-empty summary wins. All-empty falls through to the caller's
    /// placeholder as an empty string.
    async fn fetch_last_text(&self, session_id: &str, role: Role) -> String {
        for attempt in 0..self.retry_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.retry_pause).await;
            }
            match self.source.session_messages(session_id).await {
                Ok(messages) => {
                    if let Some(message) = last_message_of_role(&messages, role) {
                        let text = summarize(&message.parts, NOTIFY_SUMMARY_MAX);
                        if !text.is_empty() {
                            return text;
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, session = session_id, "message fetch failed");
                }
            }
        }
        String::new()
    }

    /// Build and dispatch the turn-complete notification payload.
    ///
    /// Skipped silently when the message list is unavailable or the final
    /// assistant message has no text.
    async fn notify_turn_complete(&self, session_id: &str) {
        let messages = match self.source.session_messages(session_id).await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::debug!(error = %e, session = session_id, "notification fetch failed");
                return;
            }
        };
        let Some(assistant) = last_message_of_role(&messages, Role::Assistant) else {
            return;
        };
        let assistant_text = summarize(&assistant.parts, NOTIFY_SUMMARY_MAX);
        if assistant_text.is_empty() {
            return;
        }

        let recent_users: Vec<&Message> = messages
            .iter()
            .filter(|m| m.info.role == Role::User)
            .collect();
        let input_messages: Vec<String> = recent_users
            .iter()
            .skip(recent_users.len().saturating_sub(NOTIFY_INPUT_MESSAGES))
            .map(|m| summarize(&m.parts, NOTIFY_SUMMARY_MAX))
            .filter(|t| !t.is_empty())
            .collect();

        let payload = TurnNotification::new(assistant_text, input_messages);
        self.dispatcher.dispatch_notification(&payload).await;
    }
}
