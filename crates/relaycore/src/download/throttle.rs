use std::time::Duration;
use tokio::time::Instant;

/// Gate that lets a status update through at most once per `interval`.
///
/// The clock starts when the throttle is created: the caller has just shown
/// an initial status, so the first update is due one interval later.
#[derive(Debug, Clone)]
pub struct StatusThrottle {
    interval: Duration,
    last_emit: Instant,
}

impl StatusThrottle {
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    pub fn starting_at(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            last_emit: start,
        }
    }

    /// Returns true and records `now` if an update may be emitted.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_emit) >= self.interval {
            self.last_emit = now;
            true
        } else {
            false
        }
    }
}
