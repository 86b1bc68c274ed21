//! Inbound event classification
//!
//! The host runtime emits heterogeneous JSON events of the shape
//! `{"type": "...", "properties": {...}}`. This module decodes them into a
//! tagged union so the lifecycle state machine never probes raw JSON.
//! Unknown kinds and payloads missing required fields classify as
//! [`HostEvent::Ignored`] and are dropped without effect.

use serde::Deserialize;
use serde_json::Value;

use crate::summary::{MessagePart, Role};

/// Session activity reported by a `session.status` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Busy,
    Idle,
}

/// A classified host runtime event.
#[derive(Debug, Clone)]
pub enum HostEvent {
    /// Polled session status changed.
    SessionStatus {
        session_id: String,
        status: SessionStatus,
    },
    /// Explicit idle signal for a session.
    SessionIdle { session_id: String },
    /// Message metadata updated; `completed` is the completion timestamp
    /// when the message has finished streaming.
    MessageUpdated {
        message_id: String,
        role: Role,
        session_id: String,
        completed: Option<f64>,
    },
    /// A single message part changed (text streams in through these).
    MessagePartUpdated { part: MessagePart },
    /// The operator submitted a chat message.
    ChatSubmitted {
        role: Role,
        session_id: String,
        parts: Vec<MessagePart>,
    },
    /// Unrecognized or malformed event; produces no behavior.
    Ignored,
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    properties: Value,
}

#[derive(Deserialize)]
struct StatusProps {
    #[serde(rename = "sessionID")]
    session_id: String,
    status: StatusField,
}

#[derive(Deserialize)]
struct StatusField {
    #[serde(rename = "type")]
    kind: SessionStatus,
}

#[derive(Deserialize)]
struct IdleProps {
    #[serde(rename = "sessionID")]
    session_id: String,
}

#[derive(Deserialize)]
struct MessageUpdatedProps {
    info: MessageInfoProps,
}

#[derive(Deserialize)]
struct MessageInfoProps {
    id: String,
    role: Role,
    #[serde(rename = "sessionID")]
    session_id: String,
    #[serde(default)]
    time: MessageTimeProps,
}

#[derive(Deserialize, Default)]
struct MessageTimeProps {
    #[serde(default)]
    completed: Option<f64>,
}

#[derive(Deserialize)]
struct PartUpdatedProps {
    part: MessagePart,
}

#[derive(Deserialize)]
struct ChatProps {
    message: ChatMessageProps,
    #[serde(default)]
    parts: Vec<MessagePart>,
}

#[derive(Deserialize)]
struct ChatMessageProps {
    role: Role,
    #[serde(rename = "sessionID")]
    session_id: String,
}

impl HostEvent {
    /// Classify a raw host event value.
    ///
    /// Decode failures are expected (the host emits many kinds this plugin
    /// does not care about) and map to [`HostEvent::Ignored`].
    pub fn classify(value: &Value) -> Self {
        let Ok(raw) = serde_json::from_value::<RawEvent>(value.clone()) else {
            return Self::Ignored;
        };
        match raw.kind.as_str() {
            "session.status" => match serde_json::from_value::<StatusProps>(raw.properties) {
                Ok(p) => Self::SessionStatus {
                    session_id: p.session_id,
                    status: p.status.kind,
                },
                Err(_) => Self::Ignored,
            },
            "session.idle" => match serde_json::from_value::<IdleProps>(raw.properties) {
                Ok(p) => Self::SessionIdle {
                    session_id: p.session_id,
                },
                Err(_) => Self::Ignored,
            },
            "message.updated" => {
                match serde_json::from_value::<MessageUpdatedProps>(raw.properties) {
                    Ok(p) => Self::MessageUpdated {
                        message_id: p.info.id,
                        role: p.info.role,
                        session_id: p.info.session_id,
                        completed: p.info.time.completed,
                    },
                    Err(_) => Self::Ignored,
                }
            }
            "message.part.updated" => {
                match serde_json::from_value::<PartUpdatedProps>(raw.properties) {
                    Ok(p) => Self::MessagePartUpdated { part: p.part },
                    Err(_) => Self::Ignored,
                }
            }
            "chat.message" => match serde_json::from_value::<ChatProps>(raw.properties) {
                Ok(p) => Self::ChatSubmitted {
                    role: p.message.role,
                    session_id: p.message.session_id,
                    parts: p.parts,
                },
                Err(_) => Self::Ignored,
            },
            _ => Self::Ignored,
        }
    }

    /// Classify one newline-delimited JSON line from the event stream.
    pub fn classify_line(line: &str) -> Self {
        match serde_json::from_str::<Value>(line) {
            Ok(value) => Self::classify(&value),
            Err(_) => Self::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_status_busy() {
        let value = json!({
            "type": "session.status",
            "properties": {"sessionID": "s1", "status": {"type": "busy"}}
        });
        match HostEvent::classify(&value) {
            HostEvent::SessionStatus { session_id, status } => {
                assert_eq!(session_id, "s1");
                assert_eq!(status, SessionStatus::Busy);
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_classify_status_missing_session_is_ignored() {
        let value = json!({
            "type": "session.status",
            "properties": {"status": {"type": "idle"}}
        });
        assert!(matches!(HostEvent::classify(&value), HostEvent::Ignored));
    }

    #[test]
    fn test_classify_status_missing_status_is_ignored() {
        let value = json!({
            "type": "session.status",
            "properties": {"sessionID": "s1"}
        });
        assert!(matches!(HostEvent::classify(&value), HostEvent::Ignored));
    }

    #[test]
    fn test_classify_session_idle() {
        let value = json!({
            "type": "session.idle",
            "properties": {"sessionID": "s2"}
        });
        match HostEvent::classify(&value) {
            HostEvent::SessionIdle { session_id } => assert_eq!(session_id, "s2"),
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_classify_message_updated_with_completion() {
        let value = json!({
            "type": "message.updated",
            "properties": {
                "info": {
                    "id": "m1",
                    "role": "assistant",
                    "sessionID": "s1",
                    "time": {"created": 1.0, "completed": 2.0}
                }
            }
        });
        match HostEvent::classify(&value) {
            HostEvent::MessageUpdated {
                message_id,
                role,
                session_id,
                completed,
            } => {
                assert_eq!(message_id, "m1");
                assert_eq!(role, Role::Assistant);
                assert_eq!(session_id, "s1");
                assert_eq!(completed, Some(2.0));
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_classify_message_updated_without_time() {
        let value = json!({
            "type": "message.updated",
            "properties": {
                "info": {"id": "m2", "role": "user", "sessionID": "s1"}
            }
        });
        match HostEvent::classify(&value) {
            HostEvent::MessageUpdated { completed, .. } => assert_eq!(completed, None),
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_classify_part_updated() {
        let value = json!({
            "type": "message.part.updated",
            "properties": {
                "part": {"type": "text", "text": "hello", "messageID": "m1"}
            }
        });
        match HostEvent::classify(&value) {
            HostEvent::MessagePartUpdated { part } => {
                assert_eq!(part.kind, "text");
                assert_eq!(part.text.as_deref(), Some("hello"));
                assert_eq!(part.message_id.as_deref(), Some("m1"));
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_classify_chat_submission() {
        let value = json!({
            "type": "chat.message",
            "properties": {
                "message": {"role": "user", "sessionID": "s3"},
                "parts": [{"type": "text", "text": "do the thing"}]
            }
        });
        match HostEvent::classify(&value) {
            HostEvent::ChatSubmitted {
                role,
                session_id,
                parts,
            } => {
                assert_eq!(role, Role::User);
                assert_eq!(session_id, "s3");
                assert_eq!(parts.len(), 1);
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_classify_unknown_kind() {
        let value = json!({"type": "storage.write", "properties": {}});
        assert!(matches!(HostEvent::classify(&value), HostEvent::Ignored));
    }

    #[test]
    fn test_classify_line_invalid_json() {
        assert!(matches!(
            HostEvent::classify_line("{not json"),
            HostEvent::Ignored
        ));
    }
}
