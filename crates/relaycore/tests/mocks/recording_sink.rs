#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use relaycore::{RelayError, StatusSink};

/// Records every published status; optionally fails each publish.
#[derive(Default)]
pub struct RecordingSink {
    published: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every publish errors after recording the text
    pub fn failing() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn published(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }

    /// Number of in-progress renders (excludes the completion status)
    pub fn progress_updates(&self) -> usize {
        self.published()
            .iter()
            .filter(|text| text.starts_with("Downloading:"))
            .count()
    }
}

#[async_trait]
impl StatusSink for RecordingSink {
    async fn publish(&self, text: String) -> Result<(), RelayError> {
        self.published.lock().unwrap().push(text);
        if self.fail {
            Err(RelayError::Transport("Bad Request: chat not found".to_string()))
        } else {
            Ok(())
        }
    }
}
