use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration constants for the relay
/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Folder finished downloads are relocated to before being sent.
/// Read from DOWNLOAD_FOLDER environment variable, defaults to `downloads`
/// relative to the working directory. Supports tilde (~) expansion.
pub static DOWNLOAD_FOLDER: Lazy<String> =
    Lazy::new(|| env::var("DOWNLOAD_FOLDER").unwrap_or_else(|_| "downloads".to_string()));

/// Parent directory for per-job working directories.
/// Read from TEMP_FILES_DIR environment variable, defaults to the system temp dir.
pub static TEMP_FILES_DIR: Lazy<Option<String>> = Lazy::new(|| env::var("TEMP_FILES_DIR").ok());

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// Log level filter ("error", "warn", "info", "debug", "trace")
/// Read from LOG_LEVEL environment variable
/// Default: info
pub static LOG_LEVEL: Lazy<String> = Lazy::new(|| env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Base URL of a self-hosted Bot API server, e.g. `http://localhost:8081`.
/// Unset means the public Telegram API.
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| env::var("BOT_API_URL").ok().filter(|s| !s.is_empty()));

/// Resolves `DOWNLOAD_FOLDER` with tilde expansion.
pub fn download_folder() -> PathBuf {
    PathBuf::from(shellexpand::tilde(DOWNLOAD_FOLDER.as_str()).into_owned())
}

/// Resolves `TEMP_FILES_DIR`, falling back to the system temp dir.
pub fn temp_files_dir() -> PathBuf {
    match TEMP_FILES_DIR.as_deref() {
        Some(dir) if !dir.is_empty() => PathBuf::from(shellexpand::tilde(dir).into_owned()),
        _ => env::temp_dir(),
    }
}

/// Progress reporting configuration
pub mod progress {
    use super::Duration;

    /// Minimum interval between two status edits (in seconds).
    /// Telegram rate-limits message edits; do not lower this.
    pub const STATUS_INTERVAL_SECS: u64 = 2;

    /// Number of cells in the rendered progress bar
    pub const BAR_WIDTH: usize = 20;

    /// Status interval duration
    pub fn status_interval() -> Duration {
        Duration::from_secs(STATUS_INTERVAL_SECS)
    }
}

/// Download configuration
pub mod download {
    use super::Duration;

    /// Highest video height requested from the downloader
    pub const MAX_VIDEO_HEIGHT: u32 = 720;

    /// Timeout for `--version` checks (in seconds)
    pub const VERSION_PROBE_TIMEOUT_SECS: u64 = 10;

    /// Version check timeout duration
    pub fn version_check_timeout() -> Duration {
        Duration::from_secs(VERSION_PROBE_TIMEOUT_SECS)
    }
}

/// Retry configuration
pub mod retry {
    use super::Duration;

    /// Delay before the supervisor restarts the dispatcher (in seconds)
    pub const SUPERVISOR_RESTART_DELAY_SECS: u64 = 5;

    /// Supervisor restart delay duration
    pub fn supervisor_delay() -> Duration {
        Duration::from_secs(SUPERVISOR_RESTART_DELAY_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    /// Large video uploads through a local Bot API server can take minutes
    pub const REQUEST_TIMEOUT_SECS: u64 = 900; // 15 minutes

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_interval_is_two_seconds() {
        assert_eq!(progress::status_interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_download_folder_expands_tilde() {
        let folder = download_folder();
        assert!(!folder.to_string_lossy().starts_with('~'));
    }
}
