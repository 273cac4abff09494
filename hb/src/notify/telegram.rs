//! Telegram Bot API notifier
//!
//! Uses `sendMessage` to post plain text into a single chat.
//! Docs: <https://core.telegram.org/bots/api#sendmessage>

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::Notifier;
use crate::config::TelegramConfig;
use crate::error::NotifyError;

/// Telegram notifier bound to one chat
pub struct TelegramNotifier {
    base_url: String,
    chat_id: String,
    http: Client,
}

/// Envelope every Bot API response is wrapped in
#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    /// Create a notifier from config, the bot token and the target chat
    pub fn new(config: &TelegramConfig, bot_token: &str, chat_id: impl Into<String>) -> Result<Self, NotifyError> {
        debug!(base_url = %config.base_url, timeout_ms = config.timeout_ms, "TelegramNotifier::new: called");
        let http = Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            base_url: format!("{}/bot{}", config.base_url.trim_end_matches('/'), bot_token),
            chat_id: chat_id.into(),
            http,
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/sendMessage", self.base_url)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        debug!(chat_id = %self.chat_id, text_len = text.len(), "send: called");

        // The URL embeds the bot token, keep it out of error text
        let response = self
            .http
            .post(self.send_message_url())
            .json(&json!({
                "chat_id": self.chat_id,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.without_url()))?;

        let status = response.status().as_u16();
        let body: Option<BotApiResponse> = response.json().await.ok();

        match body {
            Some(BotApiResponse { ok: true, .. }) => Ok(()),
            Some(BotApiResponse { description, .. }) => Err(NotifyError::Rejected {
                status,
                description: description.unwrap_or_else(|| "no description".to_string()),
            }),
            None => Err(NotifyError::Rejected {
                status,
                description: "unreadable Bot API response".to_string(),
            }),
        }
    }

    fn chat_id(&self) -> &str {
        &self.chat_id
    }
}
