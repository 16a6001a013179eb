//! Status sink bound to one Telegram message

use async_trait::async_trait;
use relaycore::{RelayError, StatusSink};
use teloxide::prelude::*;
use teloxide::types::MessageId;
use teloxide::{ApiError, RequestError};

/// Publishes job status by editing the message `message_id` in `chat_id`.
pub struct EditMessageSink {
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
}

impl EditMessageSink {
    pub fn new(bot: Bot, chat_id: ChatId, message_id: MessageId) -> Self {
        Self {
            bot,
            chat_id,
            message_id,
        }
    }
}

/// Telegram refuses edits that leave the text unchanged. The message already
/// shows what we wanted, so this counts as success.
pub fn is_not_modified(err: &RequestError) -> bool {
    matches!(err, RequestError::Api(ApiError::MessageNotModified)) || err.to_string().contains("message is not modified")
}

#[async_trait]
impl StatusSink for EditMessageSink {
    async fn publish(&self, text: String) -> Result<(), RelayError> {
        match self.bot.edit_message_text(self.chat_id, self.message_id, text).await {
            Ok(_) => Ok(()),
            Err(e) if is_not_modified(&e) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
