use serde::{Deserialize, Serialize};

/// One break session's clock. Decremented once per second tick; every
/// overlay of the session reads from the same instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    total_seconds: u32,
    remaining_seconds: u32,
}

/// State after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountdownTick {
    pub remaining_seconds: u32,
    pub progress_ratio: f64,
    pub expired: bool,
}

impl Countdown {
    pub fn new(total_seconds: u32) -> Self {
        Self {
            total_seconds,
            remaining_seconds: total_seconds,
        }
    }

    pub fn total_seconds(&self) -> u32 {
        self.total_seconds
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.total_seconds - self.remaining_seconds
    }

    /// `remaining / total`, 1.0 at the start and 0.0 once expired.
    pub fn progress_ratio(&self) -> f64 {
        if self.total_seconds == 0 {
            return 0.0;
        }
        f64::from(self.remaining_seconds) / f64::from(self.total_seconds)
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_seconds == 0
    }

    /// Advance by one second, never below zero.
    pub fn tick(&mut self) -> CountdownTick {
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        CountdownTick {
            remaining_seconds: self.remaining_seconds,
            progress_ratio: self.progress_ratio(),
            expired: self.is_expired(),
        }
    }
}
