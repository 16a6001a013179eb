//! Bot initialization and command definitions
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Command menu registration

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use relaycore::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Show available commands")]
    Help,
    #[command(description = "Get a youtube video")]
    GetVideo,
}

/// Reply to `/start`
pub const WELCOME_TEXT: &str = "This bot allows you to store videos from YouTube in Telegram to be watched later.\n\
Use /get_video to download a video from YouTube.";

/// Prompt sent after `/get_video`
pub const LINK_PROMPT: &str = "Please send me a YouTube video link:";

/// Reply to `/help`
pub fn help_text() -> String {
    "Available commands:\n\n\
     🔹 /start - Start the bot\n\
     🔹 /help - Show this help message\n\
     🔹 /get_video - Download a video from YouTube\n"
        .to_string()
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Missing token, invalid `BOT_API_URL` or HTTP client setup failure
pub fn create_bot() -> anyhow::Result<Bot> {
    if config::BOT_TOKEN.is_empty() {
        anyhow::bail!("BOT_TOKEN (or TELOXIDE_TOKEN) is not set");
    }

    // Uploads of large videos can take minutes
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(config::BOT_TOKEN.as_str(), client);

    let bot = match config::BOT_API_URL.as_deref() {
        Some(bot_api_url) => {
            log::info!("Using custom Bot API URL: {}", bot_api_url);
            let url = url::Url::parse(bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
            bot.set_api_url(url)
        }
        None => bot,
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
///
/// # Arguments
/// * `bot` - Bot instance to configure
///
/// # Returns
/// * `Ok(())` - Commands set successfully
/// * `Err(RequestError)` - Failed to set commands
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}
