//! Session message retrieval
//!
//! The host runtime serves each session's message list over its local HTTP
//! API. Label resolution and notification payloads read that list through
//! the [`MessageSource`] seam so tests can substitute a scripted source.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::ApiConfig;
use crate::error::Result;
use crate::summary::{MessagePart, Role};

/// Message metadata as served by the host API.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageInfo {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub time: MessageTime,
}

/// Message timing; `completed` is set once the message finished streaming.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageTime {
    #[serde(default)]
    pub completed: Option<f64>,
}

/// One message with its parts.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub info: MessageInfo,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

impl Message {
    /// Test/helper constructor for a single-text-part message.
    pub fn with_text(id: &str, role: Role, text: &str) -> Self {
        Self {
            info: MessageInfo {
                id: id.to_string(),
                role,
                time: MessageTime::default(),
            },
            parts: vec![MessagePart::text(text)],
        }
    }
}

/// Read access to a session's message list.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Fetch all messages of a session, oldest first.
    async fn session_messages(&self, session_id: &str) -> Result<Vec<Message>>;
}

/// [`MessageSource`] backed by the host runtime's HTTP API.
pub struct HttpMessageSource {
    client: reqwest::Client,
    base_url: String,
    directory: Option<String>,
}

impl HttpMessageSource {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            directory: config.directory.clone(),
        }
    }
}

#[async_trait]
impl MessageSource for HttpMessageSource {
    async fn session_messages(&self, session_id: &str) -> Result<Vec<Message>> {
        let url = format!("{}/session/{}/message", self.base_url, session_id);
        let mut request = self.client.get(&url);
        if let Some(directory) = &self.directory {
            request = request.query(&[("directory", directory)]);
        }
        let messages = request
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Message>>()
            .await?;
        Ok(messages)
    }
}

/// Extract the newest message of `role`, if any.
pub fn last_message_of_role<'a>(messages: &'a [Message], role: Role) -> Option<&'a Message> {
    messages.iter().rev().find(|m| m.info.role == role)
}
