//! Message text summarization
//!
//! Reduces a message's ordered list of parts to a single bounded-length
//! string: non-ignored text parts joined with newlines, trimmed, then
//! truncated. Used both for task labels and notification payloads.

use serde::{Deserialize, Serialize};

/// Maximum characters carried in a turn-complete notification summary.
pub const NOTIFY_SUMMARY_MAX: usize = 600;

/// Maximum characters for a task start/finish label.
///
/// Applied by callers on top of the [`NOTIFY_SUMMARY_MAX`] cut.
pub const TASK_LABEL_MAX: usize = 200;

/// Role of a message within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One part of a message as delivered by the host runtime.
///
/// Only text parts participate in summaries; every other kind (tool calls,
/// reasoning, attachments) is skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagePart {
    /// Part kind as reported by the host (e.g. "text", "tool").
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Text content, present for text parts.
    #[serde(default)]
    pub text: Option<String>,
    /// Host-side flag marking synthetic text that must not surface.
    #[serde(default)]
    pub ignored: bool,
    /// Identifier of the message this part belongs to.
    #[serde(rename = "messageID", default)]
    pub message_id: Option<String>,
}

impl MessagePart {
    /// Convenience constructor for a plain text part.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(content.into()),
            ignored: false,
            message_id: None,
        }
    }
}

/// Summarize message parts into at most `max_chars` characters.
///
/// Filters to non-ignored text parts, joins their contents with newlines,
/// trims surrounding whitespace, and truncates on a character boundary.
/// Pure: no side effects, same input always yields the same output.
pub fn summarize(parts: &[MessagePart], max_chars: usize) -> String {
    let joined = parts
        .iter()
        .filter(|p| p.kind == "text" && !p.ignored)
        .map(|p| p.text.as_deref().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n");
    truncate_chars(joined.trim(), max_chars)
}

/// Truncate a string to `max_chars` characters without splitting a char.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_summarize_filters_empty_and_whitespace() {
        let parts = vec![
            MessagePart::text("building the parser"),
            MessagePart::text(""),
            MessagePart::text("  "),
        ];
        assert_eq!(summarize(&parts, NOTIFY_SUMMARY_MAX), "building the parser");
    }

    #[test]
    fn test_summarize_skips_non_text_parts() {
        let parts = vec![
            MessagePart {
                kind: "tool".to_string(),
                text: Some("tool output".to_string()),
                ..Default::default()
            },
            MessagePart::text("actual message"),
        ];
        assert_eq!(summarize(&parts, 600), "actual message");
    }

    #[test]
    fn test_summarize_skips_ignored_parts() {
        let parts = vec![
            MessagePart {
                ignored: true,
                ..MessagePart::text("hidden")
            },
            MessagePart::text("visible"),
        ];
        assert_eq!(summarize(&parts, 600), "visible");
    }

    #[test]
    fn test_summarize_joins_with_newline() {
        let parts = vec![MessagePart::text("first"), MessagePart::text("second")];
        assert_eq!(summarize(&parts, 600), "first\nsecond");
    }

    #[test]
    fn test_summarize_empty_input() {
        assert_eq!(summarize(&[], 600), "");
    }

    #[test]
    fn test_summarize_missing_text_field() {
        let parts = vec![MessagePart {
            kind: "text".to_string(),
            text: None,
            ..Default::default()
        }];
        assert_eq!(summarize(&parts, 600), "");
    }

    #[test]
    fn test_truncation_is_exact_and_prefix_stable() {
        let long = "x".repeat(900);
        let parts = vec![MessagePart::text(long.clone())];
        let cut = summarize(&parts, NOTIFY_SUMMARY_MAX);
        assert_eq!(cut.chars().count(), NOTIFY_SUMMARY_MAX);
        assert!(long.starts_with(&cut));
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        let s = "日本語のテキスト";
        let cut = truncate_chars(s, 3);
        assert_eq!(cut, "日本語");
    }

    #[test]
    fn test_label_cut_applies_after_notify_cut() {
        let parts = vec![MessagePart::text("y".repeat(700))];
        let notify = summarize(&parts, NOTIFY_SUMMARY_MAX);
        let label = truncate_chars(&notify, TASK_LABEL_MAX);
        assert_eq!(label.chars().count(), TASK_LABEL_MAX);
    }
}
