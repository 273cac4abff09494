//! Homework bot - review status relay
//!
//! Polls the homework review API on a fixed interval and posts a Telegram
//! message for every submission whose review status changed.
//!
//! # Core Concepts
//!
//! - **One cycle at a time**: fetch, validate, format, deliver, sleep
//! - **Delivery never blocks progress**: a failed send is logged, the
//!   timestamp still advances
//! - **Quiet failures**: a repeated cycle error is reported to the chat once
//!
//! # Modules
//!
//! - [`poller`] - Poll-notify loop and its in-memory state
//! - [`status`] - Payload validation, verdicts and message text
//! - [`api`] - Status API trait and HTTP client
//! - [`notify`] - Notifier trait and Telegram implementation
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod notify;
pub mod poller;
pub mod status;

// Re-export commonly used types
pub use api::{PracticumClient, StatusSource};
pub use config::{Config, Secrets};
pub use error::{ConfigError, NotifyError, PollError};
pub use notify::{Notifier, TelegramNotifier};
pub use poller::{CycleOutcome, PollState, Poller};
pub use status::{StatusResponse, SubmissionRecord, Verdict, format_notification, validate_response};
