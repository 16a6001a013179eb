//! Telegram bot integration and handlers

pub mod bot;
pub mod handlers;
pub mod sink;
pub mod state;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{process_video_link, schema, HandlerDeps, HandlerError, SharedRunner};
pub use sink::EditMessageSink;
pub use state::{ConversationState, ConversationStore};
