//! Parsing of yt-dlp progress lines and the per-job merged progress state.
//!
//! yt-dlp run with `--progress --newline` prints one line per update:
//!
//! ```text
//! [download]  45.2% of 10.00MiB at 500.00KiB/s ETA 00:10
//! ```
//!
//! [`parse_line`] turns such a line into a [`ProgressEvent`]; everything else
//! (extractor chatter, `Destination:` lines, merger output) yields `None`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker that prefixes every downloader progress line
pub const PROGRESS_MARKER: &str = "[download]";

static ANSI_ESCAPE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b[@-_]?").expect("ansi regex"));

/// A progress line: the marker immediately followed by the percent token.
/// `Destination:` and `has already been downloaded` lines carry the file
/// name, which may itself contain a percent sign, so they never match.
static PERCENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[download\]\s+(\d+(?:\.\d+)?)%").expect("percent regex"));

static SPEED_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\sat\s+(\d+(?:\.\d+)?)\s*([KMG]iB/s)").expect("speed regex"));

static ETA_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\sETA\s+(\d+:\d{2}(?::\d{2})?)").expect("eta regex"));

/// One parsed progress line. Fields the line did not carry are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Percent complete, clamped to 0..=100
    pub percent: Option<f64>,
    /// Download speed as printed, e.g. `"500.00 KiB/s"`
    pub speed: Option<String>,
    /// Remaining time as printed, e.g. `"00:10"`
    pub eta: Option<String>,
}

/// Removes ANSI escape sequences and other control characters.
fn clean_line(line: &str) -> String {
    let stripped = ANSI_ESCAPE_REGEX.replace_all(line, "");
    stripped
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
}

/// Parses one line of downloader output.
///
/// Only `[download] NN.N% ...` lines are progress; everything else,
/// including other `[download]` lines, returns `None`. Speed and ETA are
/// read from the `at <speed>` and `ETA <time>` tokens after the percent.
/// Never fails on malformed input.
pub fn parse_line(line: &str) -> Option<ProgressEvent> {
    let cleaned = clean_line(line);
    let line = cleaned.trim_start();
    if !line.starts_with(PROGRESS_MARKER) {
        return None;
    }

    let Some(caps) = PERCENT_REGEX.captures(line) else {
        log::trace!("Download line without progress fields: {}", line.trim());
        return None;
    };
    let percent = caps
        .get(1)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|p| p.is_finite())
        .map(|p| p.clamp(0.0, 100.0));
    let rest = &line[caps.get(0).map_or(0, |m| m.end())..];

    let speed = SPEED_REGEX
        .captures(rest)
        .and_then(|caps| Some(format!("{} {}", caps.get(1)?.as_str(), caps.get(2)?.as_str())));

    let eta = ETA_REGEX
        .captures(rest)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    let event = ProgressEvent { percent, speed, eta };
    log::debug!(
        "Progress parsed: {:?}% (speed: {:?}, eta: {:?})",
        event.percent,
        event.speed,
        event.eta
    );
    Some(event)
}

/// Running merged view of the most recent percent/speed/ETA of a job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateProgress {
    pub last_percent: f64,
    pub last_speed: Option<String>,
    pub last_eta: Option<String>,
}

impl AggregateProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges an event: fields it carries overwrite, absent fields are kept.
    ///
    /// Percent never moves backwards, so an out-of-order or bogus line cannot
    /// regress the displayed bar.
    pub fn merge(&mut self, event: &ProgressEvent) {
        if let Some(percent) = event.percent {
            if percent > self.last_percent {
                self.last_percent = percent;
            }
        }
        if let Some(speed) = &event.speed {
            self.last_speed = Some(speed.clone());
        }
        if let Some(eta) = &event.eta {
            self.last_eta = Some(eta.clone());
        }
    }
}
