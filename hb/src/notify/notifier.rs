//! Notifier trait definition

use async_trait::async_trait;

use crate::error::NotifyError;

/// Delivers text messages to the bot's fixed chat
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one message
    async fn send(&self, text: &str) -> Result<(), NotifyError>;

    /// Chat the messages go to, for log lines
    fn chat_id(&self) -> &str;
}
