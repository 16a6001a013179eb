//! Dispatcher schema and the `/get_video` conversation

use std::path::Path;
use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{InputFile, Message};

use relaycore::download::{is_video_link, render_initial, ProcessLauncher};
use relaycore::{JobResult, JobRunner, RelayError};

use super::bot::{help_text, Command, LINK_PROMPT, WELCOME_TEXT};
use super::sink::EditMessageSink;
use super::state::{ConversationState, ConversationStore};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Job runner shared by all chats
pub type SharedRunner = Arc<JobRunner<Box<dyn ProcessLauncher>>>;

/// Maximum message length for Telegram (with margin)
const MAX_MESSAGE_LENGTH: usize = 4000;

pub const INVALID_LINK_TEXT: &str = "That doesn't look like a valid YouTube link. Please send a valid YouTube link.";
pub const VIDEO_INTRO_TEXT: &str = "Here's your video:";

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub runner: SharedRunner,
    pub conversations: Arc<ConversationStore>,
}

impl HandlerDeps {
    pub fn new(runner: SharedRunner, conversations: Arc<ConversationStore>) -> Self {
        Self { runner, conversations }
    }
}

/// Caption attached to a delivered video
pub fn video_caption(link: &str) -> String {
    format!("Downloaded from: {}", link)
}

/// Message sent when a job fails. Overlong reasons keep their tail, where
/// yt-dlp prints the actual error.
pub fn failure_text(reason: &str) -> String {
    const PREFIX: &str = "Sorry, I couldn't download this video. Error: ";
    let budget = MAX_MESSAGE_LENGTH - PREFIX.len() - 4;
    let count = reason.chars().count();
    if count <= budget {
        return format!("{}{}", PREFIX, reason);
    }
    let tail: String = reason.chars().skip(count - budget).collect();
    format!("{}... {}", PREFIX, tail)
}

/// Creates the dispatcher schema for the bot.
///
/// Commands are matched first, so `/start` and `/help` work in any state.
/// Any other text reaches the link handler only while the chat is
/// awaiting a link; otherwise it is ignored.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(command_handler(deps.clone()))
        .branch(link_handler(deps))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);

                match cmd {
                    Command::Start => {
                        bot.send_message(msg.chat.id, WELCOME_TEXT).await?;
                    }
                    Command::Help => {
                        bot.send_message(msg.chat.id, help_text()).await?;
                    }
                    Command::GetVideo => {
                        bot.send_message(msg.chat.id, LINK_PROMPT).await?;
                        deps.conversations
                            .set(msg.chat.id, ConversationState::AwaitingLink);
                    }
                }
                Ok(())
            }
        },
    ))
}

fn link_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let conversations = Arc::clone(&deps.conversations);

    Update::filter_message()
        .filter(move |msg: Message| msg.text().is_some() && conversations.is_awaiting_link(msg.chat.id))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let text = msg.text().unwrap_or_default();
                process_video_link(&bot, msg.chat.id, text, &deps).await?;
                Ok(())
            }
        })
}

/// Handles the text a chat sent while awaiting a link.
///
/// An invalid link keeps the chat awaiting a link. A valid one runs a job
/// with a status message that is edited as the download progresses and
/// deleted afterwards; the chat is back to `Idle` whatever the outcome.
pub async fn process_video_link(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    deps: &HandlerDeps,
) -> Result<(), RelayError> {
    let link = text.trim();
    if !is_video_link(link) {
        log::info!("Chat {} sent something that is not a video link", chat_id);
        bot.send_message(chat_id, INVALID_LINK_TEXT).await?;
        return Ok(());
    }

    deps.conversations.reset(chat_id);

    let status = bot.send_message(chat_id, render_initial()).await?;
    let sink = EditMessageSink::new(bot.clone(), chat_id, status.id);

    let outcome = match deps.runner.run(link, &sink).await {
        JobResult::Success {
            file_path,
            file_size_bytes,
        } => deliver_video(bot, chat_id, link, &file_path, file_size_bytes).await,
        JobResult::Failure { reason, .. } => {
            log::error!("Error downloading video for chat {}: {}", chat_id, reason);
            bot.send_message(chat_id, failure_text(&reason))
                .await
                .map(|_| ())
                .map_err(RelayError::from)
        }
    };

    if let Err(e) = bot.delete_message(chat_id, status.id).await {
        log::warn!("Error deleting processing message: {}", e);
    }

    outcome
}

/// Sends the finished file and removes it from disk.
async fn deliver_video(
    bot: &Bot,
    chat_id: ChatId,
    link: &str,
    file_path: &Path,
    file_size_bytes: u64,
) -> Result<(), RelayError> {
    log::info!("Video file size: {:.2} MB", file_size_bytes as f64 / (1024.0 * 1024.0));

    let sent = send_file(bot, chat_id, link, file_path).await;

    if let Err(e) = fs_err::tokio::remove_file(file_path).await {
        log::warn!("Failed to remove delivered file: {}", e);
    }

    if let Err(e) = sent {
        log::error!("Failed to send video to chat {}: {}", chat_id, e);
        bot.send_message(chat_id, failure_text(&e.to_string())).await?;
    }
    Ok(())
}

async fn send_file(bot: &Bot, chat_id: ChatId, link: &str, file_path: &Path) -> Result<(), RelayError> {
    bot.send_message(chat_id, VIDEO_INTRO_TEXT).await?;

    let caption = video_caption(link);
    match bot
        .send_video(chat_id, InputFile::file(file_path.to_path_buf()))
        .caption(caption.clone())
        .await
    {
        Ok(_) => Ok(()),
        Err(e) => {
            log::warn!("send_video rejected ({}), sending as document instead", e);
            bot.send_document(chat_id, InputFile::file(file_path.to_path_buf()))
                .caption(caption)
                .await?;
            Ok(())
        }
    }
}
