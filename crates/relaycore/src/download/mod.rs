//! Download pipeline: link validation, the yt-dlp subprocess, progress
//! parsing and rendering, and the job runner tying them together.

pub mod link;
pub mod process;
pub mod progress;
pub mod render;
pub mod runner;
pub mod throttle;

pub use link::{is_video_link, validate_link};
pub use process::{DownloaderInvocation, ProcessLauncher, SpawnedProcess, TokioLauncher};
pub use progress::{parse_line, AggregateProgress, ProgressEvent};
pub use render::{render, render_initial, COMPLETE_STATUS};
pub use runner::{JobResult, JobRunner, RunnerConfig, StatusSink};
pub use throttle::StatusThrottle;
