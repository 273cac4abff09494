//! Homework review API access

mod practicum;
pub mod source;

pub use practicum::{PracticumClient, effective_from_date};
pub use source::StatusSource;
