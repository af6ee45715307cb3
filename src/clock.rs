use std::time::Duration;
use tokio::time::Instant;

/// The shared run origin. Captured once by the coordinator and passed by
/// value to every component that stamps output; never mutated afterwards.
///
/// Uses `tokio::time::Instant` so tests running under a paused runtime get
/// deterministic elapsed times.
#[derive(Debug, Clone, Copy)]
pub struct StartInstant(Instant);

impl StartInstant {
    pub fn now() -> Self {
        Self(Instant::now())
    }

    /// Time elapsed since the run origin.
    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }

    /// The absolute deadline `duration` after the run origin.
    pub fn deadline(&self, duration: Duration) -> Instant {
        self.0 + duration
    }

    /// Elapsed time formatted as `m:ss.mmm`.
    pub fn timestamp(&self) -> String {
        format_elapsed(self.elapsed())
    }
}

/// Formats an elapsed duration as `minutes:seconds.milliseconds`, seconds
/// zero-padded to 2 digits and milliseconds to 3, minutes unpadded.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_msec = elapsed.as_millis();
    let minutes = total_msec / 60_000;
    let remaining = total_msec % 60_000;
    let secs = remaining / 1000;
    let msecs = remaining % 1000;
    format!("{}:{:02}.{:03}", minutes, secs, msecs)
}
