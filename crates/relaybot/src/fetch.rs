//! Offline commands: a single local download and the downloader check

use std::path::PathBuf;

use async_trait::async_trait;

use relaycore::config;
use relaycore::download::process::downloader_version;
use relaycore::download::TokioLauncher;
use relaycore::{JobResult, JobRunner, RelayError, RunnerConfig, StatusSink};

/// Prints every status to the terminal.
pub struct StdoutSink;

#[async_trait]
impl StatusSink for StdoutSink {
    async fn publish(&self, text: String) -> Result<(), RelayError> {
        println!("{}\n", text);
        Ok(())
    }
}

/// Runs one job for `url`, optionally into `output` instead of `DOWNLOAD_FOLDER`.
pub async fn run_fetch(url: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    let mut runner_config = RunnerConfig::from_env();
    if let Some(dir) = output {
        runner_config.output_dir = dir;
    }

    let runner = JobRunner::new(TokioLauncher, runner_config);
    match runner.run(url, &StdoutSink).await {
        JobResult::Success {
            file_path,
            file_size_bytes,
        } => {
            println!(
                "Saved {} ({:.2} MB)",
                file_path.display(),
                file_size_bytes as f64 / (1024.0 * 1024.0)
            );
            Ok(())
        }
        JobResult::Failure { reason, exit_code } => match exit_code {
            Some(code) => anyhow::bail!("download failed (exit code {}): {}", code, reason),
            None => anyhow::bail!("download failed: {}", reason),
        },
    }
}

/// Prints the downloader version, failing when it cannot be run.
pub async fn run_check() -> anyhow::Result<()> {
    let version = downloader_version(&config::YTDL_BIN)
        .await
        .map_err(|e| anyhow::anyhow!("{} is not usable: {}", config::YTDL_BIN.as_str(), e))?;
    println!("{} {}", config::YTDL_BIN.as_str(), version);
    Ok(())
}
