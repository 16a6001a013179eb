//! Download job runner.
//!
//! One [`JobRunner::run`] call is one job: validate the link, allocate a
//! working directory, spawn yt-dlp, turn its stdout into throttled status
//! updates, then move the produced file somewhere stable.
//!
//! Jobs share nothing, so any number can run at once. To cap concurrent
//! downloads, wrap `run` in a `tokio::sync::Semaphore` at the call site.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::time::Instant;

use super::link::validate_link;
use super::process::{DownloaderInvocation, ProcessLauncher, SpawnedProcess, TokioLauncher};
use super::progress::{parse_line, AggregateProgress};
use super::render::{render, COMPLETE_STATUS};
use super::throttle::StatusThrottle;
use crate::config;
use crate::error::{RelayError, RelayResult};

/// Receives rendered status text for one job.
///
/// Errors are logged by the runner and otherwise ignored; a failing status
/// update never aborts a download.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn publish(&self, text: String) -> Result<(), RelayError>;
}

/// Outcome of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResult {
    /// `file_path` exists when returned; deleting it is the caller's job.
    Success { file_path: PathBuf, file_size_bytes: u64 },
    Failure { reason: String, exit_code: Option<i32> },
}

impl JobResult {
    pub fn is_success(&self) -> bool {
        matches!(self, JobResult::Success { .. })
    }
}

impl From<RelayError> for JobResult {
    fn from(err: RelayError) -> Self {
        JobResult::Failure {
            exit_code: err.exit_code(),
            reason: err.to_string(),
        }
    }
}

/// Settings for a [`JobRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Downloader executable
    pub ytdl_bin: String,
    /// Stable folder finished files are moved to
    pub output_dir: PathBuf,
    /// Parent of the per-job working directories
    pub temp_root: PathBuf,
    /// Minimum time between two status updates
    pub status_interval: Duration,
    /// Highest video height requested
    pub max_height: u32,
}

impl RunnerConfig {
    /// Builds the runner settings from the process environment.
    pub fn from_env() -> Self {
        Self {
            ytdl_bin: config::YTDL_BIN.clone(),
            output_dir: config::download_folder(),
            temp_root: config::temp_files_dir(),
            status_interval: config::progress::status_interval(),
            max_height: config::download::MAX_VIDEO_HEIGHT,
        }
    }
}

#[derive(Debug)]
struct ProcessOutcome {
    exit_code: Option<i32>,
    stderr: String,
    progress: AggregateProgress,
}

/// Runs download jobs through a [`ProcessLauncher`].
pub struct JobRunner<L = TokioLauncher> {
    launcher: L,
    config: RunnerConfig,
}

impl<L: ProcessLauncher> JobRunner<L> {
    pub fn new(launcher: L, config: RunnerConfig) -> Self {
        Self { launcher, config }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Downloads `url`, publishing progress to `sink`.
    ///
    /// Never panics or returns early with an error: every failure, including
    /// an invalid link, comes back as [`JobResult::Failure`]. The working
    /// directory is gone by the time this returns.
    pub async fn run(&self, url: &str, sink: &dyn StatusSink) -> JobResult {
        let job_id = short_id();
        let started = Instant::now();
        log::info!("[job {}] Download requested for {}", job_id, url.trim());

        match self.try_run(&job_id, url, sink).await {
            Ok((file_path, file_size_bytes)) => {
                log::info!(
                    "[job {}] Finished in {:.1}s: {} ({:.2} MB)",
                    job_id,
                    started.elapsed().as_secs_f64(),
                    file_path.display(),
                    file_size_bytes as f64 / (1024.0 * 1024.0)
                );
                JobResult::Success {
                    file_path,
                    file_size_bytes,
                }
            }
            Err(e) => {
                log::error!("[job {}] Failed [{}]: {}", job_id, e.subcategory(), e);
                JobResult::from(e)
            }
        }
    }

    async fn try_run(&self, job_id: &str, url: &str, sink: &dyn StatusSink) -> RelayResult<(PathBuf, u64)> {
        let url = validate_link(url)?;

        fs_err::tokio::create_dir_all(&self.config.temp_root).await?;
        // Removed on drop, on every path out of this function.
        let work_dir = tempfile::Builder::new()
            .prefix(&format!("relay-job-{}-", job_id))
            .tempdir_in(&self.config.temp_root)?;

        let invocation = DownloaderInvocation::new(&self.config.ytdl_bin, url, work_dir.path(), self.config.max_height);
        log::info!("[job {}] Running: {}", job_id, invocation.display());

        let process = self
            .launcher
            .spawn(&invocation)
            .map_err(|source| RelayError::ProcessSpawn {
                program: invocation.program.clone(),
                source,
            })?;

        let outcome = drive_process(process, self.config.status_interval, sink).await?;
        log::debug!(
            "[job {}] Downloader exited with {:?} at {:.1}%",
            job_id,
            outcome.exit_code,
            outcome.progress.last_percent
        );

        if outcome.exit_code != Some(0) {
            return Err(RelayError::ProcessExit {
                exit_code: outcome.exit_code,
                stderr: outcome.stderr,
            });
        }
        if !outcome.stderr.is_empty() {
            log::warn!("[job {}] Downloader succeeded with stderr output: {}", job_id, outcome.stderr);
        }

        let produced = find_produced_file(work_dir.path()).await?;
        let relocated = relocate_file(&produced, &self.config.output_dir).await?;
        let size = fs_err::tokio::metadata(&relocated)
            .await
            .map_err(RelayError::FileRelocation)?
            .len();

        publish_best_effort(sink, COMPLETE_STATUS.to_string()).await;

        if let Err(e) = work_dir.close() {
            log::warn!("[job {}] Failed to remove working directory: {}", job_id, e);
        }
        Ok((relocated, size))
    }
}

/// Reads stdout and stderr concurrently, then waits for the exit status.
async fn drive_process(
    process: SpawnedProcess,
    status_interval: Duration,
    sink: &dyn StatusSink,
) -> RelayResult<ProcessOutcome> {
    let SpawnedProcess { stdout, stderr, exit } = process;
    let throttle = StatusThrottle::new(status_interval);

    let (progress, stderr) = tokio::join!(pump_progress(stdout, throttle, sink), read_stderr(stderr));
    let progress = progress?;
    let exit_code = exit.await?;
    let stderr = stderr?;

    Ok(ProcessOutcome {
        exit_code,
        stderr,
        progress,
    })
}

/// Feeds every stdout line through the parser in order, merging events and
/// publishing a rendered status whenever the throttle allows.
///
/// Invalid UTF-8 is replaced rather than treated as an error.
pub async fn pump_progress<R>(
    reader: R,
    mut throttle: StatusThrottle,
    sink: &dyn StatusSink,
) -> std::io::Result<AggregateProgress>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::with_capacity(256);
    let mut progress = AggregateProgress::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        log::trace!("yt-dlp stdout: {}", line.trim_end());

        let Some(event) = parse_line(&line) else {
            continue;
        };
        progress.merge(&event);

        if throttle.try_acquire(Instant::now()) {
            publish_best_effort(sink, render(&progress)).await;
        }
    }

    Ok(progress)
}

async fn read_stderr<R>(mut reader: R) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).await?;
    let text = String::from_utf8_lossy(&bytes).trim().to_string();
    for line in text.lines() {
        log::trace!("yt-dlp stderr: {}", line);
    }
    Ok(text)
}

async fn publish_best_effort(sink: &dyn StatusSink, text: String) {
    if let Err(e) = sink.publish(text).await {
        log::warn!("Error updating progress: {}", e);
    }
}

/// Picks the produced file. With several files the first by name wins.
async fn find_produced_file(dir: &Path) -> RelayResult<PathBuf> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();

    if files.len() > 1 {
        log::warn!(
            "Downloader produced {} files, using the first: {:?}",
            files.len(),
            files.iter().filter_map(|p| p.file_name()).collect::<Vec<_>>()
        );
    }
    files.into_iter().next().ok_or(RelayError::NoFileProduced)
}

/// Moves `src` into `output_dir`, keeping its name unless already taken.
async fn relocate_file(src: &Path, output_dir: &Path) -> RelayResult<PathBuf> {
    fs_err::tokio::create_dir_all(output_dir)
        .await
        .map_err(RelayError::FileRelocation)?;

    let file_name = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or(RelayError::NoFileProduced)?;

    let mut target = output_dir.join(&file_name);
    if tokio::fs::try_exists(&target).await.unwrap_or(false) {
        target = output_dir.join(unique_file_name(&file_name));
    }

    if let Err(e) = fs_err::tokio::rename(src, &target).await {
        // Typically EXDEV when the temp dir is on another file system.
        log::debug!("Rename failed ({}), copying instead", e);
        if let Err(copy_err) = fs_err::tokio::copy(src, &target).await {
            // Do not leave a truncated file in the output folder
            if let Err(e) = fs_err::tokio::remove_file(&target).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to remove partial copy: {}", e);
                }
            }
            return Err(RelayError::FileRelocation(copy_err));
        }
    }
    Ok(target)
}

/// `name.ext` -> `name_1a2b3c4d.ext`
fn unique_file_name(file_name: &str) -> String {
    let suffix = short_id();
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, suffix, ext),
        _ => format!("{}_{}", file_name, suffix),
    }
}

fn short_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}
