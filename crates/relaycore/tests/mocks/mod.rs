//! Test doubles for the job runner: a scripted downloader process and a
//! status sink that records what it was sent.

pub mod mock_launcher;
pub mod recording_sink;

pub use mock_launcher::{MockLauncher, MockScript, StdoutScript};
pub use recording_sink::RecordingSink;
