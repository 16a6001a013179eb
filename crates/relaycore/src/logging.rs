//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A startup summary of the resolved configuration

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::config;

/// Parses a level name, falling back to `Info` for anything unknown.
pub fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Info)
}

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
/// * `level` - Level filter applied to both sinks
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the log file or a logger was already set
pub fn init_logger(log_file_path: &str, level: LevelFilter) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(level, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the resolved configuration at startup
pub fn log_startup_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("Relay configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("YTDL_BIN:        {}", config::YTDL_BIN.as_str());
    log::info!("DOWNLOAD_FOLDER: {}", config::download_folder().display());
    log::info!("TEMP_FILES_DIR:  {}", config::temp_files_dir().display());
    match config::BOT_API_URL.as_deref() {
        Some(url) => log::info!("BOT_API_URL:     {} (self-hosted Bot API)", url),
        None => log::info!("BOT_API_URL:     not set (public Bot API, 50 MB upload limit)"),
    }
    if config::BOT_TOKEN.is_empty() {
        log::warn!("BOT_TOKEN is not set; only the offline CLI commands will work");
    }
    log::info!(
        "Status updates at most every {}s, max video height {}p",
        config::progress::STATUS_INTERVAL_SECS,
        config::download::MAX_VIDEO_HEIGHT
    );
}
