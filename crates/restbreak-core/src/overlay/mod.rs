//! Break overlays: one per display, all driven by one shared countdown.

mod coordinator;
mod countdown;
mod display;
mod surface;
mod theme;

pub use coordinator::{BreakSession, OverlayCoordinator, OverlayHandle, OverlayId, SessionSummary};
pub use countdown::{Countdown, CountdownTick};
pub use display::{Display, DisplayProvider, Rect, StaticDisplays, OVERLAY_SCALE};
pub use surface::{OverlaySurface, OverlayView, DISMISS_LABEL, HEADLINE};
pub use theme::{Rgb, Theme};
