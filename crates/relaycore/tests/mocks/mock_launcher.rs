//! Scripted stand-in for yt-dlp
//!
//! Instead of starting a process, [`MockLauncher`] drops the configured files
//! into the job working directory and replays canned stdout/stderr.

#![allow(dead_code)]

use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::task::{Context, Poll};
use std::time::Duration;

use relaycore::download::{DownloaderInvocation, ProcessLauncher, SpawnedProcess};
use tokio::io::{AsyncRead, AsyncWriteExt, ReadBuf};

/// How stdout is produced
#[derive(Debug, Clone)]
pub enum StdoutScript {
    /// Everything available at once
    Immediate(Vec<String>),
    /// One line every `delay`, written from a background task
    Paced { lines: Vec<String>, delay: Duration },
    /// Raw bytes, not necessarily UTF-8
    Raw(Vec<u8>),
    /// `lines`, then a read error instead of end of stream
    BrokenAfter(Vec<String>),
}

/// Reader that serves `data` and then fails every further read.
struct BrokenReader {
    data: Vec<u8>,
    pos: usize,
}

impl AsyncRead for BrokenReader {
    fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        if self.pos < self.data.len() {
            let start = self.pos;
            let n = buf.remaining().min(self.data.len() - start);
            buf.put_slice(&self.data[start..start + n]);
            self.pos += n;
            Poll::Ready(Ok(()))
        } else {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "downloader stdout broke")))
        }
    }
}

/// What a single mocked run does
#[derive(Debug, Clone)]
pub struct MockScript {
    pub stdout: StdoutScript,
    pub stderr: String,
    pub exit_code: Option<i32>,
    /// Files (name, contents) created in the working directory on spawn
    pub files: Vec<(String, Vec<u8>)>,
    /// Fail the spawn itself with this error kind
    pub spawn_error: Option<io::ErrorKind>,
}

impl MockScript {
    /// A clean run producing `file_name` with `size` bytes
    pub fn success(file_name: &str, size: usize) -> Self {
        Self {
            stdout: StdoutScript::Immediate(vec![
                "[youtube] abc123: Downloading webpage".to_string(),
                "[download] Destination: video.mp4".to_string(),
                "[download]  10.0% of 1.00MiB at 500.00KiB/s ETA 00:05".to_string(),
                "[download]  55.5% of 1.00MiB at 1.20MiB/s ETA 00:02".to_string(),
                "[download] 100% of 1.00MiB in 00:03".to_string(),
            ]),
            stderr: String::new(),
            exit_code: Some(0),
            files: vec![(file_name.to_string(), vec![7u8; size])],
            spawn_error: None,
        }
    }

    /// Downloader exits with `code` and `stderr`, producing nothing
    pub fn failing(code: i32, stderr: &str) -> Self {
        Self {
            stdout: StdoutScript::Immediate(vec!["[youtube] abc123: Downloading webpage".to_string()]),
            stderr: stderr.to_string(),
            exit_code: Some(code),
            files: Vec::new(),
            spawn_error: None,
        }
    }

    pub fn with_files(mut self, files: Vec<(String, Vec<u8>)>) -> Self {
        self.files = files;
        self
    }

    pub fn with_stdout(mut self, stdout: StdoutScript) -> Self {
        self.stdout = stdout;
        self
    }
}

/// Launcher that replays a [`MockScript`] and counts invocations
pub struct MockLauncher {
    script: MockScript,
    spawn_count: AtomicUsize,
    invocations: Mutex<Vec<DownloaderInvocation>>,
}

impl MockLauncher {
    pub fn new(script: MockScript) -> Self {
        Self {
            script,
            spawn_count: AtomicUsize::new(0),
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn spawn_count(&self) -> usize {
        self.spawn_count.load(Ordering::SeqCst)
    }

    pub fn invocations(&self) -> Vec<DownloaderInvocation> {
        self.invocations.lock().unwrap().clone()
    }
}

fn joined(lines: &[String]) -> Vec<u8> {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.into_bytes()
}

impl ProcessLauncher for MockLauncher {
    fn spawn(&self, invocation: &DownloaderInvocation) -> io::Result<SpawnedProcess> {
        self.spawn_count.fetch_add(1, Ordering::SeqCst);
        self.invocations.lock().unwrap().push(invocation.clone());

        if let Some(kind) = self.script.spawn_error {
            return Err(io::Error::new(kind, "mock spawn failure"));
        }

        for (name, contents) in &self.script.files {
            std::fs::write(invocation.work_dir.join(name), contents)?;
        }

        let stdout: relaycore::download::process::BoxedReader = match &self.script.stdout {
            StdoutScript::Immediate(lines) => Box::pin(io::Cursor::new(joined(lines))),
            StdoutScript::Paced { lines, delay } => {
                let (mut writer, reader) = tokio::io::duplex(64 * 1024);
                let lines = lines.clone();
                let delay = *delay;
                tokio::spawn(async move {
                    for (i, line) in lines.iter().enumerate() {
                        if i > 0 {
                            tokio::time::sleep(delay).await;
                        }
                        if writer.write_all(format!("{}\n", line).as_bytes()).await.is_err() {
                            return;
                        }
                    }
                });
                Box::pin(reader)
            }
            StdoutScript::Raw(bytes) => Box::pin(io::Cursor::new(bytes.clone())),
            StdoutScript::BrokenAfter(lines) => Box::pin(BrokenReader {
                data: joined(lines),
                pos: 0,
            }),
        };

        let exit_code = self.script.exit_code;
        Ok(SpawnedProcess {
            stdout,
            stderr: Box::pin(io::Cursor::new(self.script.stderr.clone().into_bytes())),
            exit: Box::pin(async move { Ok(exit_code) }),
        })
    }
}
