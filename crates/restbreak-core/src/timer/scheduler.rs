//! Reminder scheduler.
//!
//! Owns the single repeating reminder timer and the pending skip count.
//! It knows nothing about overlays: each fire is classified as stale,
//! skipped or a break request, and the engine decides what to do with it.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Armed -> (fire) -> Armed
//!           ^ configure()  |
//!           +--------------+
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::source::{TimerId, TimerKind, TimerService};
use crate::events::Event;
use crate::storage::ReminderConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Idle,
    Armed,
}

/// What a reminder fire amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// Not the currently armed reminder timer; a leftover from before a
    /// reconfiguration or stop.
    Stale,
    /// Consumed by a pending skip. Carries the skips still pending.
    Skipped { pending_skips: u32 },
    /// A break is due, lasting `break_seconds`.
    Break { break_seconds: u32 },
}

#[derive(Debug, Default)]
pub struct Scheduler {
    config: Option<ReminderConfig>,
    timer: Option<TimerId>,
    pending_skips: u32,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SchedulerState {
        if self.timer.is_some() {
            SchedulerState::Armed
        } else {
            SchedulerState::Idle
        }
    }

    pub fn timer_id(&self) -> Option<TimerId> {
        self.timer
    }

    pub fn config(&self) -> Option<ReminderConfig> {
        self.config
    }

    pub fn pending_skips(&self) -> u32 {
        self.pending_skips
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Cancel any armed reminder timer and arm a new one at
    /// `config.interval_seconds`, counted from now. Pending skips survive.
    pub fn configure<T>(&mut self, timers: &mut T, config: ReminderConfig) -> Event
    where
        T: TimerService + ?Sized,
    {
        if let Some(old) = self.timer.take() {
            timers.cancel(old);
        }
        let id = timers.arm(TimerKind::Reminder, config.interval());
        self.timer = Some(id);
        self.config = Some(config);
        info!(
            %id,
            interval_secs = config.interval_seconds,
            break_secs = config.break_seconds,
            "reminder timer armed"
        );
        Event::SchedulerArmed {
            interval_secs: config.interval_seconds,
            at: Utc::now(),
        }
    }

    /// Disarm the reminder timer. Returns `None` when already idle.
    pub fn stop<T>(&mut self, timers: &mut T) -> Option<Event>
    where
        T: TimerService + ?Sized,
    {
        let id = self.timer.take()?;
        timers.cancel(id);
        info!(%id, "reminder timer stopped");
        Some(Event::SchedulerStopped { at: Utc::now() })
    }

    /// Suppress the next `n` fires. Overwrites any count already pending.
    pub fn skip_next(&mut self, n: u32) -> Event {
        self.pending_skips = n;
        info!(pending_skips = n, "skip count set");
        Event::SkipsUpdated {
            pending_skips: n,
            at: Utc::now(),
        }
    }

    /// Classify a fire delivered for `id`.
    pub fn on_fire(&mut self, id: TimerId) -> FireOutcome {
        let config = match (self.timer, self.config) {
            (Some(armed), Some(config)) if armed == id => config,
            _ => {
                debug!(%id, "ignoring stale reminder fire");
                return FireOutcome::Stale;
            }
        };

        if self.pending_skips > 0 {
            self.pending_skips -= 1;
            debug!(pending_skips = self.pending_skips, "reminder skipped");
            return FireOutcome::Skipped {
                pending_skips: self.pending_skips,
            };
        }

        FireOutcome::Break {
            break_seconds: config.break_seconds,
        }
    }
}
