//! Chat message formatting

use crate::error::PollError;

use super::response::SubmissionRecord;
use super::verdict::Verdict;

/// Prefix of the operator alert sent when a cycle fails
pub const ERROR_PREFIX: &str = "Сбой в работе программы: ";

/// Build the status change message for one submission
pub fn format_notification(record: &SubmissionRecord) -> Result<String, PollError> {
    let Some(name) = record.name.as_deref() else {
        return Err(PollError::malformed("homework entry missing homework_name"));
    };
    let Some(status) = record.status.as_deref() else {
        return Err(PollError::malformed("homework entry missing status"));
    };

    let verdict: Verdict = status.parse()?;
    Ok(format!(
        "Изменился статус проверки работы \"{}\". {}",
        name,
        verdict.description()
    ))
}

/// Build the operator alert for a failed cycle
pub fn format_error_notification(error: &PollError) -> String {
    format!("{}{}", ERROR_PREFIX, error)
}
