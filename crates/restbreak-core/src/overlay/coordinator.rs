//! Overlay coordinator.
//!
//! Owns at most one [`BreakSession`]. Starting a session fans out one overlay
//! per connected display, all sharing one countdown and one theme. Every way a
//! session can end (dismiss action, countdown expiry, shutdown) goes through
//! [`OverlayCoordinator::dismiss_session`], which cancels the countdown timer
//! and closes every overlay before returning.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::countdown::Countdown;
use super::display::{Display, DisplayProvider, Rect, OVERLAY_SCALE};
use super::surface::{OverlaySurface, OverlayView};
use super::theme::Theme;
use crate::events::{EndReason, Event};
use crate::timer::{TimerId, TimerKind, TimerService};

const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

/// Identity of one overlay. Unique across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayId(u64);

impl OverlayId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlay-{}", self.0)
    }
}

/// One overlay, bound to one display. Holds geometry only; everything it
/// shows comes from the session's [`OverlayView`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayHandle {
    id: OverlayId,
    display_id: String,
    frame: Rect,
}

impl OverlayHandle {
    /// Overlay covering the central [`OVERLAY_SCALE`] of `display`'s work area.
    pub fn for_display(id: OverlayId, display: &Display) -> Self {
        Self {
            id,
            display_id: display.id.clone(),
            frame: display.work_area.centered_fraction(OVERLAY_SCALE),
        }
    }

    pub fn id(&self) -> OverlayId {
        self.id
    }

    pub fn display_id(&self) -> &str {
        &self.display_id
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }
}

#[derive(Debug)]
pub struct BreakSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    countdown: Countdown,
    theme: Theme,
    overlays: Vec<OverlayHandle>,
    countdown_timer: TimerId,
}

impl BreakSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn total_seconds(&self) -> u32 {
        self.countdown.total_seconds()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.countdown.remaining_seconds()
    }

    pub fn progress_ratio(&self) -> f64 {
        self.countdown.progress_ratio()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn overlays(&self) -> &[OverlayHandle] {
        &self.overlays
    }

    pub fn countdown_timer(&self) -> TimerId {
        self.countdown_timer
    }

    pub fn owns(&self, overlay: OverlayId) -> bool {
        self.overlays.iter().any(|o| o.id == overlay)
    }

    /// The `(remaining, progress, theme)` tuple every overlay renders.
    pub fn view(&self) -> OverlayView {
        OverlayView {
            remaining_seconds: self.countdown.remaining_seconds(),
            progress_ratio: self.countdown.progress_ratio(),
            theme: self.theme,
        }
    }
}

/// Summary of the active session, for status output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub total_seconds: u32,
    pub remaining_seconds: u32,
    pub progress_ratio: f64,
    pub overlays: Vec<OverlayHandle>,
    pub theme: Theme,
}

impl From<&BreakSession> for SessionSummary {
    fn from(session: &BreakSession) -> Self {
        Self {
            session_id: session.id,
            total_seconds: session.total_seconds(),
            remaining_seconds: session.remaining_seconds(),
            progress_ratio: session.progress_ratio(),
            overlays: session.overlays.clone(),
            theme: session.theme,
        }
    }
}

pub struct OverlayCoordinator<D, S> {
    displays: D,
    surface: S,
    rng: Mcg128Xsl64,
    session: Option<BreakSession>,
    next_overlay: u64,
}

impl<D, S> OverlayCoordinator<D, S>
where
    D: DisplayProvider,
    S: OverlaySurface,
{
    /// `seed` fixes the sequence of session themes; `None` draws from entropy.
    pub fn new(displays: D, surface: S, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self {
            displays,
            surface,
            rng,
            session: None,
            next_overlay: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> Option<&BreakSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn displays(&self) -> &D {
        &self.displays
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Open a session lasting `break_seconds`. A no-op returning `None` while
    /// another session is active.
    pub fn start_session<T>(&mut self, timers: &mut T, break_seconds: u32) -> Option<Event>
    where
        T: TimerService + ?Sized,
    {
        if let Some(active) = &self.session {
            debug!(session_id = %active.id, "break already active, not starting another");
            return None;
        }

        let theme = Theme::random(&mut self.rng);
        let displays = self.displays.displays();
        if displays.is_empty() {
            warn!("no displays connected, break runs without overlays");
        }

        let mut overlays = Vec::with_capacity(displays.len());
        for display in &displays {
            self.next_overlay += 1;
            overlays.push(OverlayHandle::for_display(OverlayId(self.next_overlay), display));
        }

        let session = BreakSession {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            countdown: Countdown::new(break_seconds),
            theme,
            overlays,
            countdown_timer: timers.arm(TimerKind::Countdown, COUNTDOWN_PERIOD),
        };

        let view = session.view();
        for overlay in &session.overlays {
            self.surface.open(overlay, &view);
        }

        info!(
            session_id = %session.id,
            total_secs = break_seconds,
            overlays = session.overlays.len(),
            background = %theme.background,
            "break started"
        );
        let event = Event::BreakStarted {
            session_id: session.id,
            total_seconds: break_seconds,
            overlays: session.overlays.len(),
            background: theme.background.to_string(),
            foreground: theme.foreground.to_string(),
            at: session.started_at,
        };
        self.session = Some(session);
        Some(event)
    }

    /// Tear down the active session: cancel its countdown, close every
    /// overlay. Returns `None` when nothing is active.
    pub fn dismiss_session<T>(&mut self, timers: &mut T, reason: EndReason) -> Option<Event>
    where
        T: TimerService + ?Sized,
    {
        let session = self.session.take()?;
        timers.cancel(session.countdown_timer);
        for overlay in &session.overlays {
            self.surface.close(overlay);
        }

        let elapsed_seconds = session.countdown.elapsed_seconds();
        info!(
            session_id = %session.id,
            ?reason,
            elapsed_secs = elapsed_seconds,
            "break ended"
        );
        Some(Event::BreakEnded {
            session_id: session.id,
            reason,
            elapsed_seconds,
            at: Utc::now(),
        })
    }

    /// Dismiss action from one overlay. Ends the whole session, but only if
    /// the overlay belongs to it.
    pub fn dismiss_from<T>(&mut self, timers: &mut T, overlay: OverlayId) -> Option<Event>
    where
        T: TimerService + ?Sized,
    {
        match &self.session {
            Some(session) if session.owns(overlay) => {
                self.dismiss_session(timers, EndReason::Dismissed)
            }
            _ => {
                debug!(%overlay, "dismiss from unknown overlay ignored");
                None
            }
        }
    }

    /// Handle a countdown fire. Returns `None` if `id` is not the active
    /// session's countdown timer.
    pub fn on_countdown_fire<T>(&mut self, timers: &mut T, id: TimerId) -> Option<Vec<Event>>
    where
        T: TimerService + ?Sized,
    {
        let session = self.session.as_mut().filter(|s| s.countdown_timer == id)?;

        let tick = session.countdown.tick();
        let view = session.view();
        for overlay in &session.overlays {
            self.surface.update(overlay, &view);
        }
        debug!(
            session_id = %session.id,
            remaining_secs = tick.remaining_seconds,
            "countdown tick"
        );

        let mut events = vec![Event::CountdownTicked {
            session_id: session.id,
            remaining_seconds: tick.remaining_seconds,
            progress_ratio: tick.progress_ratio,
            at: Utc::now(),
        }];
        if tick.expired {
            events.extend(self.dismiss_session(timers, EndReason::Expired));
        }
        Some(events)
    }
}

impl<D, S> fmt::Debug for OverlayCoordinator<D, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayCoordinator")
            .field("session", &self.session)
            .field("next_overlay", &self.next_overlay)
            .finish_non_exhaustive()
    }
}
