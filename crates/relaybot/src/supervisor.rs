//! Process supervisor
//!
//! Registers the command menu, runs the dispatcher on its own task and
//! starts it again after a fixed delay when it panics or fails to start.
//! A normal return (Ctrl-C) ends the loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;
use tokio::time::sleep;

use relaycore::config;
use relaycore::download::process::log_downloader_version;
use relaycore::download::{ProcessLauncher, TokioLauncher};
use relaycore::{JobRunner, RunnerConfig};

use crate::telegram::{create_bot, schema, setup_bot_commands, ConversationStore, HandlerDeps, SharedRunner};

/// Builds the bot and its dependencies, then supervises the dispatcher.
pub async fn run_bot() -> Result<()> {
    let bot = create_bot()?;
    log_downloader_version(&config::YTDL_BIN).await;

    let launcher: Box<dyn ProcessLauncher> = Box::new(TokioLauncher);
    let runner: SharedRunner = Arc::new(JobRunner::new(launcher, RunnerConfig::from_env()));
    let deps = HandlerDeps::new(runner, Arc::new(ConversationStore::new()));

    supervise(config::retry::supervisor_delay(), || run_dispatcher(bot.clone(), deps.clone())).await
}

/// Calls `attempt` until it returns `Ok`, sleeping `restart_delay` after
/// every error. The delay is the same for every restart.
pub async fn supervise<F, Fut>(restart_delay: Duration, mut attempt: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut restarts: u64 = 0;
    loop {
        match attempt().await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                return Ok(());
            }
            Err(e) => {
                restarts += 1;
                log::error!("Connection error: {:#}", e);
                log::info!(
                    "Retrying in {} seconds (restart #{})...",
                    restart_delay.as_secs(),
                    restarts
                );
                sleep(restart_delay).await;
            }
        }
    }
}

/// One dispatcher lifetime: command registration plus long polling.
async fn run_dispatcher(bot: Bot, deps: HandlerDeps) -> Result<()> {
    setup_bot_commands(&bot)
        .await
        .map_err(|e| anyhow!("Failed to register bot commands: {}", e))?;

    let handler = schema(deps);

    // Panics inside the dispatcher surface through the JoinHandle
    let handle = tokio::spawn(async move {
        let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

        Dispatcher::builder(bot, handler)
            .enable_ctrlc_handler()
            .build()
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("An error from the update listener"),
            )
            .await
    });

    match handle.await {
        Ok(()) => Ok(()),
        Err(join_err) if join_err.is_panic() => Err(anyhow!("Dispatcher panicked: {}", join_err)),
        Err(join_err) => {
            log::warn!("Dispatcher task was cancelled: {}", join_err);
            Ok(())
        }
    }
}
