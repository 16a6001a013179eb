use thiserror::Error;

/// Error taxonomy of a download job.
///
/// Everything the job runner can hit is one of these variants. The runner never
/// lets them escape: [`crate::download::JobRunner::run`] folds them into a
/// [`crate::download::JobResult::Failure`].
#[derive(Error, Debug)]
pub enum RelayError {
    /// Input did not look like a YouTube video link
    #[error("invalid link: {0}")]
    InvalidLink(String),

    /// The downloader could not be started
    #[error("failed to start downloader '{program}': {source}")]
    ProcessSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The downloader exited unsuccessfully
    #[error("yt-dlp error (exit code {}): {stderr}", display_code(.exit_code))]
    ProcessExit { exit_code: Option<i32>, stderr: String },

    /// The downloader exited cleanly but left nothing behind
    #[error("no files were downloaded")]
    NoFileProduced,

    /// The produced file could not be moved out of the working directory
    #[error("failed to relocate downloaded file: {0}")]
    FileRelocation(#[source] std::io::Error),

    /// Chat transport errors (status edits, final sends)
    #[error("transport error: {0}")]
    Transport(String),

    /// Other IO errors (working directory allocation, stream reads)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Short label used in logs
    pub fn subcategory(&self) -> &'static str {
        match self {
            RelayError::InvalidLink(_) => "invalid_link",
            RelayError::ProcessSpawn { .. } => "process_spawn",
            RelayError::ProcessExit { .. } => "process_exit",
            RelayError::NoFileProduced => "no_file",
            RelayError::FileRelocation(_) => "file_relocation",
            RelayError::Transport(_) => "transport",
            RelayError::Io(_) => "io",
        }
    }

    /// Exit code of the downloader, when the failure came from its exit status
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RelayError::ProcessExit { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

#[cfg(feature = "telegram")]
impl From<teloxide::RequestError> for RelayError {
    fn from(err: teloxide::RequestError) -> Self {
        RelayError::Transport(err.to_string())
    }
}

/// Type alias for Result with RelayError
pub type RelayResult<T> = Result<T, RelayError>;
