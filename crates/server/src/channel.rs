//! Outbound message channels

use async_trait::async_trait;
use salu_core::Presence;
use serde::Serialize;
use std::sync::Mutex;

use crate::runtime::Channel;

/// One item delivered to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Outbound {
    Text { text: String },
    Presence { state: Presence },
}

/// Collects outbound items so a request handler can return them
#[derive(Default)]
pub struct RecordingChannel {
    items: Mutex<Vec<Outbound>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_outbound(self) -> Vec<Outbound> {
        self.items
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Items recorded so far
    pub fn items(&self) -> Vec<Outbound> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn push(&self, item: Outbound) {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(item);
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    async fn send_text(&self, _conversation_id: &str, text: &str) {
        self.push(Outbound::Text {
            text: text.to_string(),
        });
    }

    async fn set_presence(&self, _conversation_id: &str, presence: Presence) {
        self.push(Outbound::Presence { state: presence });
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayload<'a> {
    conversation_id: &'a str,
    #[serde(flatten)]
    item: &'a Outbound,
}

/// Pushes messages that are not answers to a request, such as the idle
/// notice, to a webhook
#[derive(Clone)]
pub struct WebhookChannel {
    http: reqwest::Client,
    url: String,
}

impl WebhookChannel {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    async fn deliver(&self, conversation_id: &str, item: Outbound) {
        let payload = WebhookPayload {
            conversation_id,
            item: &item,
        };
        match self.http.post(&self.url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => tracing::warn!(
                conversation_id,
                status = %response.status(),
                "Outbound webhook rejected message"
            ),
            Err(e) => tracing::warn!(
                conversation_id,
                error = %e,
                "Outbound webhook unreachable"
            ),
        }
    }
}

#[async_trait]
impl Channel for WebhookChannel {
    async fn send_text(&self, conversation_id: &str, text: &str) {
        self.deliver(
            conversation_id,
            Outbound::Text {
                text: text.to_string(),
            },
        )
        .await;
    }

    async fn set_presence(&self, conversation_id: &str, presence: Presence) {
        self.deliver(conversation_id, Outbound::Presence { state: presence })
            .await;
    }
}

/// Fallback when no webhook is configured: messages only reach the log
pub struct LogChannel;

#[async_trait]
impl Channel for LogChannel {
    async fn send_text(&self, conversation_id: &str, text: &str) {
        tracing::info!(conversation_id, text, "Outbound message (no webhook configured)");
    }

    async fn set_presence(&self, conversation_id: &str, presence: Presence) {
        tracing::debug!(conversation_id, ?presence, "Presence update (no webhook configured)");
    }
}
