use anyhow::Result;
use dotenvy::dotenv;

use relaybot::cli::{Cli, Commands};
use relaybot::{fetch, supervisor};
use relaycore::{config, logging};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, bot creation) or if an
/// offline command fails.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env before any config is read
    let _ = dotenv();

    // Log panics (the supervisor restarts a panicked dispatcher)
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {}", panic_info);
    }));

    logging::init_logger(&config::LOG_FILE_PATH, logging::parse_level(&config::LOG_LEVEL))?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            logging::log_startup_configuration();
            supervisor::run_bot().await
        }
        Commands::Fetch { url, output } => fetch::run_fetch(&url, output).await,
        Commands::Check => fetch::run_check().await,
    }
}
