//! Message delivery to the bot's chat

pub mod notifier;
mod telegram;

pub use notifier::Notifier;
pub use telegram::TelegramNotifier;
