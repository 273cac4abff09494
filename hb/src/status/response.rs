//! Status API payload and its shape checks

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::PollError;

/// One submission whose review status changed
///
/// Fields are optional on the wire; `format_notification` rejects records
/// without a name or status. Other keys the API sends are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    #[serde(rename = "homework_name", alias = "name", default)]
    pub name: Option<String>,

    #[serde(default)]
    pub status: Option<String>,
}

impl SubmissionRecord {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            status: Some(status.into()),
        }
    }
}

/// A validated status API response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResponse {
    /// Changed submissions, in the order the API returned them
    pub homeworks: Vec<SubmissionRecord>,

    /// Server time to use as `from_date` on the next request
    pub current_date: i64,
}

/// Check the decoded payload and extract its records
pub fn validate_response(payload: &Value) -> Result<StatusResponse, PollError> {
    info!("Validating status API response");

    let Some(map) = payload.as_object() else {
        return Err(PollError::malformed("not a mapping"));
    };

    let homeworks = match map.get("homeworks") {
        None | Some(Value::Null) => return Err(PollError::malformed("missing homeworks")),
        Some(v) => v,
    };

    let current_date = match map.get("current_date") {
        None | Some(Value::Null) => return Err(PollError::malformed("missing current_date")),
        Some(v) => v,
    };

    let Some(entries) = homeworks.as_array() else {
        return Err(PollError::malformed("homeworks not a sequence"));
    };

    let Some(current_date) = current_date.as_i64() else {
        return Err(PollError::malformed("current_date not an integer"));
    };

    let homeworks = entries
        .iter()
        .map(|entry| {
            if !entry.is_object() {
                return Err(PollError::malformed("homework entry not a mapping"));
            }
            serde_json::from_value(entry.clone())
                .map_err(|e| PollError::malformed(format!("invalid homework entry: {}", e)))
        })
        .collect::<Result<Vec<SubmissionRecord>, _>>()?;

    if homeworks.is_empty() {
        debug!("validate_response: no status changes");
    }

    info!(count = homeworks.len(), current_date, "Status API response is valid");
    Ok(StatusResponse { homeworks, current_date })
}
