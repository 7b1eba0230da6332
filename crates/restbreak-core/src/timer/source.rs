//! Time source abstraction.
//!
//! The scheduler and the break countdown never sleep or spawn anything
//! themselves. They ask a [`TimerService`] to arm repeating timers and are
//! later handed the [`TimerId`] of each fire by whoever drives them. The
//! production driver is `runtime::TokioTimers`; tests use [`ManualTimers`]
//! and inject fires directly.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Identity of one armed timer. Never reused within a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    /// Repeats every reminder interval.
    Reminder,
    /// Repeats every second while a break is on screen.
    Countdown,
}

pub trait TimerService {
    /// Arm a repeating timer. The first fire is due one full `period` after
    /// this call.
    fn arm(&mut self, kind: TimerKind, period: Duration) -> TimerId;

    /// Disarm a timer. Unknown or already cancelled ids are ignored.
    fn cancel(&mut self, id: TimerId);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmedTimer {
    pub id: TimerId,
    pub kind: TimerKind,
    pub period: Duration,
}

/// In-memory timer service that never fires on its own.
#[derive(Debug, Default)]
pub struct ManualTimers {
    next_id: u64,
    armed: Vec<ArmedTimer>,
    cancelled: Vec<TimerId>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently armed timers, oldest first.
    pub fn armed(&self) -> &[ArmedTimer] {
        &self.armed
    }

    /// Currently armed timers of one kind.
    pub fn armed_of(&self, kind: TimerKind) -> Vec<&ArmedTimer> {
        self.armed.iter().filter(|t| t.kind == kind).collect()
    }

    /// The single armed timer of `kind`, if exactly one exists.
    pub fn only(&self, kind: TimerKind) -> Option<TimerId> {
        match self.armed_of(kind).as_slice() {
            [one] => Some(one.id),
            _ => None,
        }
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.armed.iter().any(|t| t.id == id)
    }

    pub fn was_cancelled(&self, id: TimerId) -> bool {
        self.cancelled.contains(&id)
    }
}

impl TimerService for ManualTimers {
    fn arm(&mut self, kind: TimerKind, period: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.armed.push(ArmedTimer { id, kind, period });
        id
    }

    fn cancel(&mut self, id: TimerId) {
        let before = self.armed.len();
        self.armed.retain(|t| t.id != id);
        if self.armed.len() != before {
            self.cancelled.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_never_reused() {
        let mut timers = ManualTimers::new();
        let a = timers.arm(TimerKind::Reminder, Duration::from_secs(60));
        timers.cancel(a);
        let b = timers.arm(TimerKind::Reminder, Duration::from_secs(60));
        assert_ne!(a, b);
        assert!(timers.was_cancelled(a));
        assert!(timers.is_armed(b));
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut timers = ManualTimers::new();
        let id = timers.arm(TimerKind::Countdown, Duration::from_secs(1));
        timers.cancel(id);
        timers.cancel(id);
        assert!(!timers.is_armed(id));
        assert!(timers.was_cancelled(id));
        assert_eq!(timers.armed().len(), 0);
    }

    #[test]
    fn only_requires_exactly_one_timer_of_kind() {
        let mut timers = ManualTimers::new();
        assert_eq!(timers.only(TimerKind::Reminder), None);
        let id = timers.arm(TimerKind::Reminder, Duration::from_secs(60));
        timers.arm(TimerKind::Countdown, Duration::from_secs(1));
        assert_eq!(timers.only(TimerKind::Reminder), Some(id));
        timers.arm(TimerKind::Reminder, Duration::from_secs(60));
        assert_eq!(timers.only(TimerKind::Reminder), None);
    }
}
