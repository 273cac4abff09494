//! StatusSource trait definition

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PollError;

/// Fetches raw status payloads from the homework review API
///
/// Implementations only classify transport outcomes; shape checks happen in
/// `validate_response`.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Request every status change since `from_date` (seconds since epoch)
    async fn fetch(&self, from_date: i64) -> Result<Value, PollError>;
}
