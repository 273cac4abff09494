//! Homework status payloads, verdicts and message formatting

mod message;
mod response;
mod verdict;

pub use message::{ERROR_PREFIX, format_error_notification, format_notification};
pub use response::{StatusResponse, SubmissionRecord, validate_response};
pub use verdict::Verdict;
