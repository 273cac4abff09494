//! Homework review API client
//!
//! Issues `GET <endpoint>?from_date=<ts>` with an OAuth header and hands the
//! decoded JSON body back to the poller.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::StatusSource;
use crate::config::ApiConfig;
use crate::error::PollError;

/// Homework review API client
pub struct PracticumClient {
    endpoint: String,
    token: String,
    http: Client,
    timeout: Duration,
}

impl PracticumClient {
    /// Create a client from config and the resolved OAuth token
    pub fn new(config: &ApiConfig, token: impl Into<String>) -> Result<Self, PollError> {
        debug!(endpoint = %config.endpoint, timeout_ms = config.timeout_ms, "PracticumClient::new: called");
        let timeout = config.timeout();
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PollError::Connection(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            token: token.into(),
            http,
            timeout,
        })
    }

    fn authorization(&self) -> String {
        format!("OAuth {}", self.token)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// A `from_date` of zero means "starting now"
pub fn effective_from_date(from_date: i64) -> i64 {
    if from_date == 0 {
        chrono::Utc::now().timestamp()
    } else {
        from_date
    }
}

#[async_trait]
impl StatusSource for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<Value, PollError> {
        let from_date = effective_from_date(from_date);
        info!(endpoint = %self.endpoint, from_date, "Requesting homework statuses");

        let response = self
            .http
            .get(&self.endpoint)
            .header("Authorization", self.authorization())
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| {
                debug!(error = %e, "fetch: network error");
                PollError::Connection(e.without_url().to_string())
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "fetch: API error");
            return Err(PollError::ApiStatusCode {
                status: status.as_u16(),
                reason,
                body,
            });
        }

        // A body that stops arriving is a transport failure, not a bad payload
        let body = response.bytes().await.map_err(|e| {
            debug!(error = %e, "fetch: body read error");
            PollError::Connection(e.without_url().to_string())
        })?;
        let payload: Value =
            serde_json::from_slice(&body).map_err(|e| PollError::malformed(format!("invalid JSON body: {}", e)))?;

        info!("Homework statuses received");
        Ok(payload)
    }
}
