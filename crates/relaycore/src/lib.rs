//! relaycore - download engine of the video relay bot
//!
//! Runs yt-dlp for a single YouTube link, turns its progress output into
//! throttled status text and hands back the finished file. Nothing in here
//! knows about Telegram; the `telegram` feature only adds error conversions.
//!
//! # Module Structure
//!
//! - `config`: environment configuration and constants
//! - `error`: error taxonomy of a job
//! - `logging`: logger setup
//! - `download`: the job pipeline

pub mod config;
pub mod download;
pub mod error;
pub mod logging;

pub use download::{JobResult, JobRunner, RunnerConfig, StatusSink};
pub use error::{RelayError, RelayResult};
