//! State carried between poll cycles

use tracing::debug;

/// In-memory poll state, reset on every process start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    last_timestamp: i64,
    last_error_signature: Option<String>,
}

impl PollState {
    /// Start polling from `timestamp` with no error seen yet
    pub fn new(timestamp: i64) -> Self {
        Self {
            last_timestamp: timestamp,
            last_error_signature: None,
        }
    }

    /// Start polling from the current time
    pub fn starting_now() -> Self {
        Self::new(chrono::Utc::now().timestamp())
    }

    /// Start from a configured timestamp, where absent or zero means now
    ///
    /// Zero is resolved here once, so the window stays fixed across failed cycles.
    pub fn from_start(from_date: Option<i64>) -> Self {
        match from_date {
            Some(ts) if ts != 0 => Self::new(ts),
            _ => Self::starting_now(),
        }
    }

    pub fn last_timestamp(&self) -> i64 {
        self.last_timestamp
    }

    pub fn last_error_signature(&self) -> Option<&str> {
        self.last_error_signature.as_deref()
    }

    /// Record a cycle that fetched, validated and formatted cleanly
    ///
    /// Advances the timestamp and forgets the last error, so a recurrence
    /// after recovery is reported as a fresh incident.
    pub fn record_success(&mut self, current_date: i64) {
        debug!(
            old = self.last_timestamp,
            new = current_date,
            "record_success: advancing timestamp"
        );
        self.last_timestamp = current_date;
        self.last_error_signature = None;
    }

    /// Record a failed cycle; returns true if this error is new
    pub fn record_error(&mut self, signature: String) -> bool {
        let is_new = self.last_error_signature.as_deref() != Some(signature.as_str());
        debug!(is_new, %signature, "record_error: called");
        self.last_error_signature = Some(signature);
        is_new
    }
}
