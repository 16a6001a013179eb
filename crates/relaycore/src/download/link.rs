//! Accepted video link shape

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::RelayError;

/// Optional scheme, optional `www.`, a watch or short link host, then an id of
/// word/hyphen characters. Anchored at the start only, like a prefix match.
static YOUTUBE_LINK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?(?:youtube\.com/watch\?v=|youtu\.be/)[\w\-]+")
        .expect("link regex")
});

/// Returns true if `text` looks like a YouTube video link.
///
/// Surrounding whitespace is ignored.
pub fn is_video_link(text: &str) -> bool {
    YOUTUBE_LINK_REGEX.is_match(text.trim())
}

/// Validates `text` and returns the trimmed link.
pub fn validate_link(text: &str) -> Result<&str, RelayError> {
    let trimmed = text.trim();
    if is_video_link(trimmed) {
        Ok(trimmed)
    } else {
        Err(RelayError::InvalidLink(trimmed.to_string()))
    }
}
