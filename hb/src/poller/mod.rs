//! Poll-notify loop and its state

mod engine;
mod state;

pub use engine::{CycleOutcome, Poller};
pub use state::PollState;
