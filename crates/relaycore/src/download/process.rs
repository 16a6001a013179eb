//! Subprocess seam between the job runner and the external downloader.
//!
//! The runner only sees a [`SpawnedProcess`]: two byte streams and an exit
//! future. [`TokioLauncher`] backs it with a real `tokio::process::Child`;
//! tests plug in their own [`ProcessLauncher`].

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use tokio::io::AsyncRead;
use tokio::process::Command;

use crate::config;

/// Output template placed inside the job working directory
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

pub type BoxedReader = Pin<Box<dyn AsyncRead + Send>>;
pub type ExitFuture = Pin<Box<dyn Future<Output = io::Result<Option<i32>>> + Send>>;

/// Fully-built downloader command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloaderInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub work_dir: PathBuf,
}

impl DownloaderInvocation {
    /// Builds the yt-dlp invocation for `url`, writing into `work_dir`.
    ///
    /// Quality is capped at `max_height`, geo restrictions are bypassed and
    /// progress is printed one line per update so it can be parsed.
    pub fn new(program: &str, url: &str, work_dir: &Path, max_height: u32) -> Self {
        let output_template = work_dir.join(OUTPUT_TEMPLATE);
        let args = vec![
            url.to_string(),
            "-o".to_string(),
            output_template.to_string_lossy().into_owned(),
            "-f".to_string(),
            format!("best[height<={}]", max_height),
            "--geo-bypass".to_string(),
            "--progress".to_string(),
            "--newline".to_string(),
            "--no-playlist".to_string(),
        ];
        Self {
            program: program.to_string(),
            args,
            work_dir: work_dir.to_path_buf(),
        }
    }

    /// Command line for logs
    pub fn display(&self) -> String {
        format!("{} {}", self.program, self.args.join(" "))
    }
}

/// A started downloader: its output streams and a future resolving to the
/// exit code (`None` when killed by a signal).
pub struct SpawnedProcess {
    pub stdout: BoxedReader,
    pub stderr: BoxedReader,
    pub exit: ExitFuture,
}

/// Starts downloader processes.
pub trait ProcessLauncher: Send + Sync {
    fn spawn(&self, invocation: &DownloaderInvocation) -> io::Result<SpawnedProcess>;
}

impl<L: ProcessLauncher + ?Sized> ProcessLauncher for Box<L> {
    fn spawn(&self, invocation: &DownloaderInvocation) -> io::Result<SpawnedProcess> {
        (**self).spawn(invocation)
    }
}

/// Production launcher backed by `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct TokioLauncher;

impl ProcessLauncher for TokioLauncher {
    fn spawn(&self, invocation: &DownloaderInvocation) -> io::Result<SpawnedProcess> {
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "downloader stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "downloader stderr not captured"))?;

        Ok(SpawnedProcess {
            stdout: Box::pin(stdout),
            stderr: Box::pin(stderr),
            exit: Box::pin(async move { child.wait().await.map(|status| status.code()) }),
        })
    }
}

/// Reads `<bin> --version`, bounded by the version check timeout.
pub async fn downloader_version(program: &str) -> io::Result<String> {
    let output = tokio::time::timeout(
        config::download::version_check_timeout(),
        Command::new(program).arg("--version").stdin(Stdio::null()).output(),
    )
    .await
    .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, format!("{} --version timed out", program)))??;

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !output.status.success() || version.is_empty() {
        return Err(io::Error::other(format!(
            "{} --version produced no output (status {:?})",
            program,
            output.status.code()
        )));
    }
    Ok(version)
}

/// Logs the downloader version at startup; failures are only warned about.
pub async fn log_downloader_version(program: &str) {
    match downloader_version(program).await {
        Ok(version) => log::info!("{} version: {}", program, version),
        Err(e) => log::warn!("Failed to get {} version: {}. Downloads will fail until it is installed.", program, e),
    }
}
