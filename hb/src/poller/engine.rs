//! Poll-notify loop
//!
//! Each cycle fetches status changes since the last good timestamp, turns
//! them into chat messages and delivers them. Failures before delivery are
//! reported to the chat once per distinct error.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::state::PollState;
use crate::api::StatusSource;
use crate::error::PollError;
use crate::notify::Notifier;
use crate::status::{format_error_notification, format_notification, validate_response};

/// Result of a single cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Fetch, validation and formatting succeeded; the timestamp advanced
    Completed {
        sent: usize,
        failed: usize,
        current_date: i64,
    },

    /// The cycle failed before delivery; `notified` is false when the alert
    /// was suppressed as a repeat
    Failed { error: PollError, notified: bool },
}

impl CycleOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CycleOutcome::Completed { .. })
    }
}

/// Drives the poll-notify cycle and owns the poll state
pub struct Poller {
    source: Arc<dyn StatusSource>,
    notifier: Arc<dyn Notifier>,
    retry_interval: Duration,
    state: PollState,
}

impl Poller {
    pub fn new(
        source: Arc<dyn StatusSource>,
        notifier: Arc<dyn Notifier>,
        retry_interval: Duration,
        state: PollState,
    ) -> Self {
        Self {
            source,
            notifier,
            retry_interval,
            state,
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Fetch, validate and format; nothing is sent here
    ///
    /// All messages are built before any is delivered, so a bad record
    /// anywhere in the batch sends nothing.
    async fn collect_messages(&self) -> Result<(Vec<String>, i64), PollError> {
        let from_date = self.state.last_timestamp();
        debug!(from_date, "collect_messages: called");

        let payload = self.source.fetch(from_date).await?;
        let response = validate_response(&payload)?;

        let messages = response
            .homeworks
            .iter()
            .map(format_notification)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((messages, response.current_date))
    }

    /// Send each message; failures are logged and skipped
    async fn deliver(&self, messages: &[String]) -> (usize, usize) {
        let chat_id = self.notifier.chat_id();
        let mut sent = 0;
        let mut failed = 0;

        for message in messages {
            match self.notifier.send(message).await {
                Ok(()) => {
                    info!(%chat_id, %message, "Message delivered");
                    sent += 1;
                }
                Err(e) => {
                    error!(%chat_id, %message, error = %e, "Failed to deliver message");
                    failed += 1;
                }
            }
        }

        (sent, failed)
    }

    /// Report a cycle error to the chat unless it repeats the previous one
    async fn report_error(&mut self, err: &PollError) -> bool {
        error!(kind = err.kind(), transport = err.is_transport(), error = %err, "Poll cycle failed");

        if !self.state.record_error(err.signature()) {
            debug!("report_error: repeated error, alert suppressed");
            return false;
        }

        let alert = format_error_notification(err);
        if let Err(e) = self.notifier.send(&alert).await {
            error!(chat_id = %self.notifier.chat_id(), error = %e, "Failed to deliver error alert");
        }
        true
    }

    /// Run one cycle without sleeping
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        match self.collect_messages().await {
            Ok((messages, current_date)) => {
                if messages.is_empty() {
                    debug!("run_cycle: no status changes");
                }
                let (sent, failed) = self.deliver(&messages).await;
                if failed > 0 {
                    warn!(sent, failed, "Some messages were not delivered");
                }
                self.state.record_success(current_date);
                CycleOutcome::Completed {
                    sent,
                    failed,
                    current_date,
                }
            }
            Err(err) => {
                let notified = self.report_error(&err).await;
                CycleOutcome::Failed { error: err, notified }
            }
        }
    }

    /// Run the poll loop
    ///
    /// Never returns; every cycle is followed by exactly one sleep.
    pub async fn run(mut self) {
        info!(
            interval_secs = self.retry_interval.as_secs(),
            from_date = self.state.last_timestamp(),
            chat_id = %self.notifier.chat_id(),
            "Poller started"
        );

        loop {
            let outcome = self.run_cycle().await;
            debug!(?outcome, "run: cycle finished");

            tokio::time::sleep(self.retry_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::source::mock::MockStatusSource;
    use crate::notify::notifier::mock::MockNotifier;
    use serde_json::json;

    const APPROVED: &str = "Изменился статус проверки работы \"Proj1\". Работа проверена: ревьюеру всё понравилось. Ура!";

    fn poller(source: &Arc<MockStatusSource>, notifier: &Arc<MockNotifier>, start: i64) -> Poller {
        Poller::new(
            source.clone(),
            notifier.clone(),
            Duration::from_secs(600),
            PollState::new(start),
        )
    }

    #[tokio::test]
    async fn test_single_status_change() {
        let source = Arc::new(MockStatusSource::new(vec![Ok(json!({
            "homeworks": [{"homework_name": "Proj1", "status": "approved"}],
            "current_date": 1000,
        }))]));
        let notifier = Arc::new(MockNotifier::new());
        let mut poller = poller(&source, &notifier, 1);

        let outcome = poller.run_cycle().await;

        assert_eq!(
            outcome,
            CycleOutcome::Completed {
                sent: 1,
                failed: 0,
                current_date: 1000
            }
        );
        assert_eq!(notifier.attempts(), vec![APPROVED.to_string()]);
        assert_eq!(poller.state().last_timestamp(), 1000);
        assert_eq!(source.requested(), vec![1]);
    }

    #[tokio::test]
    async fn test_empty_homeworks_advances_timestamp() {
        let source = Arc::new(MockStatusSource::new(vec![Ok(json!({"homeworks": [], "current_date": 2000}))]));
        let notifier = Arc::new(MockNotifier::new());
        let mut poller = poller(&source, &notifier, 1);

        assert!(poller.run_cycle().await.is_completed());
        assert!(notifier.attempts().is_empty());
        assert_eq!(poller.state().last_timestamp(), 2000);
    }

    #[tokio::test]
    async fn test_next_cycle_uses_advanced_timestamp() {
        let source = Arc::new(MockStatusSource::new(vec![
            Ok(json!({"homeworks": [], "current_date": 2000})),
            Ok(json!({"homeworks": [], "current_date": 2600})),
        ]));
        let notifier = Arc::new(MockNotifier::new());
        let mut poller = poller(&source, &notifier, 1);

        poller.run_cycle().await;
        poller.run_cycle().await;

        assert_eq!(source.requested(), vec![1, 2000]);
    }

    #[tokio::test]
    async fn test_missing_keys_leave_timestamp() {
        let source = Arc::new(MockStatusSource::new(vec![
            Ok(json!({"current_date": 2000})),
            Ok(json!({"homeworks": []})),
        ]));
        let notifier = Arc::new(MockNotifier::new());
        let mut poller = poller(&source, &notifier, 1);

        let first = poller.run_cycle().await;
        assert_eq!(
            first,
            CycleOutcome::Failed {
                error: PollError::malformed("missing homeworks"),
                notified: true
            }
        );
        assert_eq!(poller.state().last_timestamp(), 1);

        let second = poller.run_cycle().await;
        assert_eq!(
            second,
            CycleOutcome::Failed {
                error: PollError::malformed("missing current_date"),
                notified: true
            }
        );
        assert_eq!(poller.state().last_timestamp(), 1);
    }

    #[tokio::test]
    async fn test_unknown_verdict_sends_no_status_message() {
        let source = Arc::new(MockStatusSource::new(vec![Ok(json!({
            "homeworks": [
                {"homework_name": "Proj1", "status": "approved"},
                {"homework_name": "Proj2", "status": "lost"},
            ],
            "current_date": 1000,
        }))]));
        let notifier = Arc::new(MockNotifier::new());
        let mut poller = poller(&source, &notifier, 1);

        let outcome = poller.run_cycle().await;

        assert_eq!(
            outcome,
            CycleOutcome::Failed {
                error: PollError::UnknownVerdict("lost".to_string()),
                notified: true
            }
        );
        // Only the operator alert went out
        let attempts = notifier.attempts();
        assert_eq!(attempts.len(), 1);
        assert!(attempts[0].starts_with("Сбой в работе программы: "));
        assert!(attempts[0].contains("lost"));
        assert_eq!(poller.state().last_timestamp(), 1);
    }

    #[tokio::test]
    async fn test_repeated_connection_error_alerts_once() {
        let source = Arc::new(MockStatusSource::new(vec![
            Err(PollError::Connection("timeout".to_string())),
            Err(PollError::Connection("timeout".to_string())),
        ]));
        let notifier = Arc::new(MockNotifier::new());
        let mut poller = poller(&source, &notifier, 1);

        let first = poller.run_cycle().await;
        let second = poller.run_cycle().await;

        assert!(matches!(first, CycleOutcome::Failed { notified: true, .. }));
        assert!(matches!(second, CycleOutcome::Failed { notified: false, .. }));
        assert_eq!(
            notifier.attempts(),
            vec!["Сбой в работе программы: Connection error: timeout".to_string()]
        );
    }

    #[tokio::test]
    async fn test_different_error_alerts_again() {
        let source = Arc::new(MockStatusSource::new(vec![
            Err(PollError::Connection("timeout".to_string())),
            Err(PollError::Connection("timeout".to_string())),
            Err(PollError::ApiStatusCode {
                status: 500,
                reason: "Internal Server Error".to_string(),
                body: "oops".to_string(),
            }),
        ]));
        let notifier = Arc::new(MockNotifier::new());
        let mut poller = poller(&source, &notifier, 1);

        poller.run_cycle().await;
        poller.run_cycle().await;
        let third = poller.run_cycle().await;

        assert!(matches!(third, CycleOutcome::Failed { notified: true, .. }));
        let attempts = notifier.attempts();
        assert_eq!(attempts.len(), 2);
        assert!(attempts[1].contains("500"));
    }

    #[tokio::test]
    async fn test_error_after_recovery_alerts_again() {
        let source = Arc::new(MockStatusSource::new(vec![
            Err(PollError::Connection("timeout".to_string())),
            Ok(json!({"homeworks": [], "current_date": 1000})),
            Err(PollError::Connection("timeout".to_string())),
        ]));
        let notifier = Arc::new(MockNotifier::new());
        let mut poller = poller(&source, &notifier, 1);

        poller.run_cycle().await;
        assert!(poller.run_cycle().await.is_completed());
        assert!(poller.state().last_error_signature().is_none());
        let third = poller.run_cycle().await;

        assert!(matches!(third, CycleOutcome::Failed { notified: true, .. }));
        assert_eq!(notifier.attempts().len(), 2);
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_block_batch() {
        let source = Arc::new(MockStatusSource::new(vec![Ok(json!({
            "homeworks": [
                {"homework_name": "hw1", "status": "reviewing"},
                {"homework_name": "hw2", "status": "rejected"},
                {"homework_name": "hw3", "status": "approved"},
            ],
            "current_date": 3000,
        }))]));
        let notifier = Arc::new(MockNotifier::failing_on(&[1]));
        let mut poller = poller(&source, &notifier, 1);

        let outcome = poller.run_cycle().await;

        assert_eq!(
            outcome,
            CycleOutcome::Completed {
                sent: 2,
                failed: 1,
                current_date: 3000
            }
        );
        let attempts = notifier.attempts();
        assert_eq!(attempts.len(), 3);
        assert!(attempts[0].contains("\"hw1\""));
        assert!(attempts[1].contains("\"hw2\""));
        assert!(attempts[2].contains("\"hw3\""));
        assert_eq!(poller.state().last_timestamp(), 3000);
    }

    #[tokio::test]
    async fn test_undelivered_alert_still_updates_signature() {
        let source = Arc::new(MockStatusSource::new(vec![
            Err(PollError::Connection("timeout".to_string())),
            Err(PollError::Connection("timeout".to_string())),
        ]));
        let notifier = Arc::new(MockNotifier::failing_on(&[0]));
        let mut poller = poller(&source, &notifier, 1);

        let first = poller.run_cycle().await;
        let second = poller.run_cycle().await;

        assert!(matches!(first, CycleOutcome::Failed { notified: true, .. }));
        assert!(matches!(second, CycleOutcome::Failed { notified: false, .. }));
        assert_eq!(notifier.attempts().len(), 1);
        assert!(poller.state().last_error_signature().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_sleeps_between_cycles() {
        let source = Arc::new(MockStatusSource::new(vec![
            Err(PollError::Connection("timeout".to_string())),
            Ok(json!({"homeworks": [], "current_date": 1000})),
            Ok(json!({"homeworks": [], "current_date": 1600})),
        ]));
        let notifier = Arc::new(MockNotifier::new());
        let poller = Poller::new(
            source.clone(),
            notifier.clone(),
            Duration::from_secs(10),
            PollState::new(1),
        );

        // Cycles start at t=0, 10 and 20
        let result = tokio::time::timeout(Duration::from_secs(25), poller.run()).await;

        assert!(result.is_err(), "run should never return");
        assert_eq!(source.requested(), vec![1, 1, 1000]);
    }
}
