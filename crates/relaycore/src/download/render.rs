//! Text rendering of job progress for the status message.

use super::progress::AggregateProgress;
use crate::config::progress::BAR_WIDTH;

const FILLED_CELL: char = '█';
const EMPTY_CELL: char = ' ';

/// Shown for speed before the downloader reported one
pub const SPEED_PLACEHOLDER: &str = "0 KiB/s";
/// Shown for ETA before the downloader reported one
pub const ETA_PLACEHOLDER: &str = "00:00";

/// Status shown once the file is ready to be sent
pub const COMPLETE_STATUS: &str = "Download complete! Sending video...";

/// Number of filled cells for `percent`: `floor(BAR_WIDTH * percent / 100)`.
pub fn filled_cells(percent: f64) -> usize {
    if !percent.is_finite() || percent <= 0.0 {
        return 0;
    }
    let cells = (BAR_WIDTH as f64 * percent / 100.0).floor() as usize;
    cells.min(BAR_WIDTH)
}

/// `[████      ]`-style bar, always `BAR_WIDTH` cells between the brackets.
pub fn progress_bar(percent: f64) -> String {
    let filled = filled_cells(percent);
    let mut bar = String::with_capacity(BAR_WIDTH * 3 + 2);
    bar.push('[');
    bar.extend(std::iter::repeat(FILLED_CELL).take(filled));
    bar.extend(std::iter::repeat(EMPTY_CELL).take(BAR_WIDTH - filled));
    bar.push(']');
    bar
}

fn footer(agg: &AggregateProgress) -> String {
    format!(
        "Speed: {} | ETA: {}",
        agg.last_speed.as_deref().unwrap_or(SPEED_PLACEHOLDER),
        agg.last_eta.as_deref().unwrap_or(ETA_PLACEHOLDER)
    )
}

/// Renders the three-line status for a job in progress.
///
/// ```
/// use relaycore::download::{render, AggregateProgress};
///
/// let agg = AggregateProgress { last_percent: 50.0, ..Default::default() };
/// assert_eq!(
///     render(&agg),
///     "Downloading: 50.0%\n[██████████          ]\nSpeed: 0 KiB/s | ETA: 00:00"
/// );
/// ```
pub fn render(agg: &AggregateProgress) -> String {
    format!(
        "Downloading: {:.1}%\n{}\n{}",
        agg.last_percent,
        progress_bar(agg.last_percent),
        footer(agg)
    )
}

/// Status sent before the downloader has produced any output.
pub fn render_initial() -> String {
    format!(
        "Initializing download...\n{}\n{}",
        progress_bar(0.0),
        footer(&AggregateProgress::default())
    )
}
