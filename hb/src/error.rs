//! Error types for the poll-notify loop

use thiserror::Error;

/// Errors that fail a single poll cycle
///
/// Every variant is recoverable: the loop reports it to the operator chat
/// (subject to dedup) and tries again on the next tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Unexpected API response: http code = {status}; reason = {reason}; content = {body}")]
    ApiStatusCode { status: u16, reason: String, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Unknown homework status: {0}")]
    UnknownVerdict(String),
}

impl PollError {
    pub fn malformed(message: impl Into<String>) -> Self {
        PollError::MalformedResponse(message.into())
    }

    /// Stable name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            PollError::Connection(_) => "Connection",
            PollError::ApiStatusCode { .. } => "ApiStatusCode",
            PollError::MalformedResponse(_) => "MalformedResponse",
            PollError::UnknownVerdict(_) => "UnknownVerdict",
        }
    }

    /// Signature used to suppress repeated identical alerts
    ///
    /// Two errors with the same kind and message text share a signature.
    pub fn signature(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }

    /// Whether the failure happened before a response body was available
    pub fn is_transport(&self) -> bool {
        matches!(self, PollError::Connection(_) | PollError::ApiStatusCode { .. })
    }
}

/// Errors from delivering a message to the chat
///
/// These are logged and never escalated.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Bot API rejected message ({status}): {description}")]
    Rejected { status: u16, description: String },
}

/// Startup configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}. Shutting down.", .missing.join(", "))]
    MissingConfiguration { missing: Vec<String> },
}
