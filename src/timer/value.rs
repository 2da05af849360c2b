//! Immutable countdown snapshot

use std::fmt;

use serde::Serialize;

/// One observed state of a countdown.
///
/// A fresh value is produced on every tick, pause, resume and stop; callers
/// only ever read it. `remaining_seconds` never exceeds `total_seconds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TimerValue {
    pub remaining_seconds: u64,
    pub total_seconds: u64,
    pub is_running: bool,
}

impl TimerValue {
    /// Create a value, clamping `remaining_seconds` to `total_seconds`
    pub fn new(remaining_seconds: u64, total_seconds: u64, is_running: bool) -> Self {
        Self {
            remaining_seconds: remaining_seconds.min(total_seconds),
            total_seconds,
            is_running,
        }
    }

    /// The value a countdown of `total_seconds` begins with
    pub fn started(total_seconds: u64) -> Self {
        Self::new(total_seconds, total_seconds, true)
    }

    /// Same countdown, one second further along.
    ///
    /// Reaching zero clears `is_running`.
    pub fn ticked(&self) -> Self {
        let remaining = self.remaining_seconds.saturating_sub(1);
        Self::new(remaining, self.total_seconds, remaining > 0)
    }

    pub fn with_running(&self, is_running: bool) -> Self {
        Self::new(self.remaining_seconds, self.total_seconds, is_running)
    }

    /// Same countdown, cancelled
    pub fn zeroed(&self) -> Self {
        Self::new(0, self.total_seconds, false)
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_seconds == 0
    }

    /// Fraction of the countdown already elapsed, in `0.0..=1.0`
    pub fn progress(&self) -> f64 {
        if self.total_seconds == 0 {
            return 0.0;
        }
        (self.total_seconds - self.remaining_seconds) as f64 / self.total_seconds as f64
    }

    /// Remaining time as zero-padded `MM:SS`
    pub fn formatted_time(&self) -> String {
        let minutes = self.remaining_seconds / 60;
        let seconds = self.remaining_seconds % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl fmt::Display for TimerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted_time())
    }
}
