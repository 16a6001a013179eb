//! Shared fixtures: a fake Telegram Bot API on wiremock and a scripted
//! downloader launcher.

#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use relaycore::download::{DownloaderInvocation, ProcessLauncher, SpawnedProcess};
use relaycore::{JobRunner, RunnerConfig};
use relaybot::telegram::{ConversationStore, HandlerDeps};
use teloxide::Bot;
use tempfile::TempDir;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CHAT_ID: i64 = 123456789;
pub const LINK: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

/// Launcher that writes an optional file and exits with a fixed code
pub struct ScriptedLauncher {
    pub exit_code: Option<i32>,
    pub stderr: String,
    pub file: Option<(String, Vec<u8>)>,
    pub spawns: Arc<AtomicUsize>,
}

impl ScriptedLauncher {
    pub fn success(spawns: Arc<AtomicUsize>) -> Self {
        Self {
            exit_code: Some(0),
            stderr: String::new(),
            file: Some(("Never Gonna Give You Up.mp4".to_string(), vec![1u8; 2048])),
            spawns,
        }
    }

    pub fn failing(spawns: Arc<AtomicUsize>, code: i32, stderr: &str) -> Self {
        Self {
            exit_code: Some(code),
            stderr: stderr.to_string(),
            file: None,
            spawns,
        }
    }
}

impl ProcessLauncher for ScriptedLauncher {
    fn spawn(&self, invocation: &DownloaderInvocation) -> io::Result<SpawnedProcess> {
        self.spawns.fetch_add(1, Ordering::SeqCst);
        if let Some((name, contents)) = &self.file {
            std::fs::write(invocation.work_dir.join(name), contents)?;
        }
        let stdout = b"[download]  50.0% of 2.00KiB at 1.00KiB/s ETA 00:01\n[download] 100% of 2.00KiB\n".to_vec();
        let exit_code = self.exit_code;
        Ok(SpawnedProcess {
            stdout: Box::pin(io::Cursor::new(stdout)),
            stderr: Box::pin(io::Cursor::new(self.stderr.clone().into_bytes())),
            exit: Box::pin(async move { Ok(exit_code) }),
        })
    }
}

/// Bot pointed at a wiremock server plus handler dependencies
pub struct Harness {
    pub server: MockServer,
    pub bot: Bot,
    pub deps: HandlerDeps,
    pub output_dir: TempDir,
    pub temp_root: TempDir,
}

impl Harness {
    pub async fn new(launcher: ScriptedLauncher) -> Self {
        let server = MockServer::start().await;
        let bot = Bot::new("test_token_12345:ABCDEF").set_api_url(server.uri().parse().unwrap());

        let output_dir = tempfile::tempdir().unwrap();
        let temp_root = tempfile::tempdir().unwrap();
        let launcher: Box<dyn ProcessLauncher> = Box::new(launcher);
        let runner = JobRunner::new(
            launcher,
            RunnerConfig {
                ytdl_bin: "yt-dlp".to_string(),
                output_dir: output_dir.path().to_path_buf(),
                temp_root: temp_root.path().to_path_buf(),
                status_interval: std::time::Duration::from_secs(2),
                max_height: 720,
            },
        );
        let deps = HandlerDeps::new(Arc::new(runner), Arc::new(ConversationStore::new()));

        Self {
            server,
            bot,
            deps,
            output_dir,
            temp_root,
        }
    }

    /// Mocks `method` with a successful response carrying `result`
    pub async fn mock_ok(&self, api_method: &str, result: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path_regex(format!("(?i)/bot[^/]+/{}$", api_method)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true, "result": result })))
            .mount(&self.server)
            .await;
    }

    /// Mocks `method` with a Bot API error, taking precedence over `mock_ok`
    pub async fn mock_error(&self, api_method: &str, description: &str) {
        Mock::given(method("POST"))
            .and(path_regex(format!("(?i)/bot[^/]+/{}$", api_method)))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": description
            })))
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Mocks everything a successful download touches
    pub async fn mock_happy_path(&self) {
        self.mock_ok("sendMessage", message_json("ok")).await;
        self.mock_ok("editMessageText", message_json("edited")).await;
        self.mock_ok("deleteMessage", serde_json::json!(true)).await;
        self.mock_ok("sendVideo", message_json("video")).await;
        self.mock_ok("sendDocument", message_json("document")).await;
    }

    /// Bodies of every request made to `api_method`, in order
    pub async fn bodies(&self, api_method: &str) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|req| {
                req.url
                    .path()
                    .to_ascii_lowercase()
                    .ends_with(&format!("/{}", api_method.to_ascii_lowercase()))
            })
            .map(|req| String::from_utf8_lossy(&req.body).into_owned())
            .collect()
    }

    pub fn output_files(&self) -> usize {
        std::fs::read_dir(self.output_dir.path()).unwrap().count()
    }
}

/// Minimal message object as returned by sendMessage and friends
pub fn message_json(text: &str) -> serde_json::Value {
    serde_json::json!({
        "message_id": 42,
        "from": {
            "id": 987654321,
            "is_bot": true,
            "first_name": "TestBot",
            "username": "test_bot"
        },
        "chat": {
            "id": CHAT_ID,
            "first_name": "Test",
            "username": "testuser",
            "type": "private"
        },
        "date": 1735992000,
        "text": text
    })
}
