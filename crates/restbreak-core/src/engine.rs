//! Reminder engine.
//!
//! Owns the scheduler, the overlay coordinator and the timer service that
//! drives both. All state changes go through [`ReminderEngine::handle`], one
//! input at a time, so nothing here needs locking.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = ReminderEngine::new(timers, coordinator);
//! engine.handle(EngineInput::Configure(config));
//! // For every timer fire delivered by the time source:
//! engine.handle(EngineInput::TimerFired(id)); // Returns the resulting events
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::{EndReason, Event};
use crate::overlay::{
    DisplayProvider, OverlayCoordinator, OverlayId, OverlaySurface, SessionSummary,
};
use crate::storage::ReminderConfig;
use crate::timer::{FireOutcome, Scheduler, SchedulerState, TimerId, TimerService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineInput {
    /// New reminder timing, typically from a settings change.
    Configure(ReminderConfig),
    /// Suppress the next `n` reminders (overwrites any pending count).
    SkipNext(u32),
    /// A timer armed through the engine's timer service fired.
    TimerFired(TimerId),
    /// Dismiss action. `None` dismisses whatever is active; `Some` only
    /// dismisses if that overlay belongs to the active session.
    Dismiss(Option<OverlayId>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub scheduler: SchedulerState,
    pub interval_secs: Option<u32>,
    pub break_secs: Option<u32>,
    pub pending_skips: u32,
    pub session: Option<SessionSummary>,
}

pub struct ReminderEngine<T, D, S> {
    timers: T,
    scheduler: Scheduler,
    overlays: OverlayCoordinator<D, S>,
}

impl<T, D, S> ReminderEngine<T, D, S>
where
    T: TimerService,
    D: DisplayProvider,
    S: OverlaySurface,
{
    pub fn new(timers: T, overlays: OverlayCoordinator<D, S>) -> Self {
        Self {
            timers,
            scheduler: Scheduler::new(),
            overlays,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn timers(&self) -> &T {
        &self.timers
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn overlays(&self) -> &OverlayCoordinator<D, S> {
        &self.overlays
    }

    pub fn overlays_mut(&mut self) -> &mut OverlayCoordinator<D, S> {
        &mut self.overlays
    }

    pub fn status(&self) -> EngineStatus {
        let config = self.scheduler.config();
        EngineStatus {
            scheduler: self.scheduler.state(),
            interval_secs: config.map(|c| c.interval_seconds),
            break_secs: config.map(|c| c.break_seconds),
            pending_skips: self.scheduler.pending_skips(),
            session: self.overlays.session().map(SessionSummary::from),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn handle(&mut self, input: EngineInput) -> Vec<Event> {
        match input {
            EngineInput::Configure(config) => {
                vec![self.scheduler.configure(&mut self.timers, config)]
            }
            EngineInput::SkipNext(n) => vec![self.scheduler.skip_next(n)],
            EngineInput::TimerFired(id) => self.on_timer(id),
            EngineInput::Dismiss(None) => self
                .overlays
                .dismiss_session(&mut self.timers, EndReason::Dismissed)
                .into_iter()
                .collect(),
            EngineInput::Dismiss(Some(overlay)) => self
                .overlays
                .dismiss_from(&mut self.timers, overlay)
                .into_iter()
                .collect(),
        }
    }

    /// End any active break and disarm the reminder timer.
    pub fn shutdown(&mut self) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .overlays
            .dismiss_session(&mut self.timers, EndReason::Dismissed)
            .into_iter()
            .collect();
        events.extend(self.scheduler.stop(&mut self.timers));
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn on_timer(&mut self, id: TimerId) -> Vec<Event> {
        if let Some(events) = self.overlays.on_countdown_fire(&mut self.timers, id) {
            return events;
        }

        match self.scheduler.on_fire(id) {
            FireOutcome::Stale => Vec::new(),
            FireOutcome::Skipped { pending_skips } => vec![Event::BreakSkipped {
                pending_skips,
                at: chrono::Utc::now(),
            }],
            FireOutcome::Break { break_seconds } => {
                if let Some(active) = self.overlays.session() {
                    debug!(session_id = %active.id(), "reminder fired during active break");
                    return vec![Event::BreakAlreadyActive {
                        session_id: active.id(),
                        at: chrono::Utc::now(),
                    }];
                }
                self.overlays
                    .start_session(&mut self.timers, break_seconds)
                    .into_iter()
                    .collect()
            }
        }
    }
}

impl<T, D, S> std::fmt::Debug for ReminderEngine<T, D, S>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderEngine")
            .field("timers", &self.timers)
            .field("scheduler", &self.scheduler)
            .field("overlays", &self.overlays)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{Display, OverlayHandle, OverlayView, Rect, StaticDisplays};
    use crate::timer::{ManualTimers, TimerKind};

    #[derive(Debug, Default)]
    struct NullSurface;

    impl OverlaySurface for NullSurface {
        fn open(&mut self, _: &OverlayHandle, _: &OverlayView) {}
        fn update(&mut self, _: &OverlayHandle, _: &OverlayView) {}
        fn close(&mut self, _: &OverlayHandle) {}
    }

    fn engine() -> ReminderEngine<ManualTimers, StaticDisplays, NullSurface> {
        let displays = StaticDisplays::new(vec![Display {
            id: "main".into(),
            work_area: Rect {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 100.0,
            },
        }]);
        let overlays = OverlayCoordinator::new(displays, NullSurface, Some(1));
        ReminderEngine::new(ManualTimers::new(), overlays)
    }

    fn reminder(engine: &ReminderEngine<ManualTimers, StaticDisplays, NullSurface>) -> TimerId {
        engine.timers().only(TimerKind::Reminder).unwrap()
    }

    #[test]
    fn fire_starts_break() {
        let mut engine = engine();
        engine.handle(EngineInput::Configure(ReminderConfig::default()));
        let events = engine.handle(EngineInput::TimerFired(reminder(&engine)));
        assert!(matches!(events.as_slice(), [Event::BreakStarted { total_seconds: 60, .. }]));
        assert!(engine.overlays().is_active());
    }

    #[test]
    fn fire_during_break_is_reported_not_started() {
        let mut engine = engine();
        engine.handle(EngineInput::Configure(ReminderConfig::default()));
        let id = reminder(&engine);
        engine.handle(EngineInput::TimerFired(id));
        let events = engine.handle(EngineInput::TimerFired(id));
        assert!(matches!(events.as_slice(), [Event::BreakAlreadyActive { .. }]));
    }

    #[test]
    fn status_reflects_state() {
        let mut engine = engine();
        let status = engine.status();
        assert_eq!(status.scheduler, SchedulerState::Idle);
        assert_eq!(status.interval_secs, None);

        engine.handle(EngineInput::Configure(ReminderConfig::default()));
        engine.handle(EngineInput::SkipNext(2));
        let status = engine.status();
        assert_eq!(status.scheduler, SchedulerState::Armed);
        assert_eq!(status.interval_secs, Some(120));
        assert_eq!(status.pending_skips, 2);
        assert!(status.session.is_none());
    }

    #[test]
    fn shutdown_clears_everything() {
        let mut engine = engine();
        engine.handle(EngineInput::Configure(ReminderConfig::default()));
        engine.handle(EngineInput::TimerFired(reminder(&engine)));

        let events = engine.shutdown();
        assert!(matches!(
            events.as_slice(),
            [Event::BreakEnded { .. }, Event::SchedulerStopped { .. }]
        ));
        assert!(engine.timers().armed().is_empty());
        assert!(engine.shutdown().is_empty());
    }
}
