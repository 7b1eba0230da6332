//! # restbreak Core Library
//!
//! This library provides the core logic for restbreak, a periodic
//! "take a break" reminder. Every reminder interval it puts an overlay on
//! every connected display for the configured break length, then removes
//! them all together when the countdown runs out or the user dismisses one.
//!
//! ## Architecture
//!
//! - **Scheduler**: one repeating reminder timer plus a pending skip count
//! - **Overlay Coordinator**: at most one break session, one overlay per
//!   display, one shared countdown and theme, all-or-nothing teardown
//! - **Engine**: single owner of both, driven one input at a time
//! - **Runtime**: tokio time source and the run loop that feeds the engine
//! - **Storage**: TOML configuration and the settings store that notifies
//!   the run loop of timing changes
//!
//! Nothing here sleeps or spawns on its own: timers are armed through
//! [`TimerService`], so tests drive everything with [`ManualTimers`].

pub mod engine;
pub mod error;
pub mod events;
pub mod overlay;
pub mod runtime;
pub mod storage;
pub mod timer;

pub use engine::{EngineInput, EngineStatus, ReminderEngine};
pub use error::{ConfigError, CoreError, Result, ValidationError};
pub use events::{EndReason, Event};
pub use overlay::{
    BreakSession, Countdown, Display, DisplayProvider, OverlayCoordinator, OverlayHandle,
    OverlayId, OverlaySurface, OverlayView, Rect, Rgb, SessionSummary, StaticDisplays, Theme,
};
pub use runtime::{Command, TokioTimers};
pub use storage::{Config, ReminderConfig, SettingsStore};
pub use timer::{ManualTimers, Scheduler, SchedulerState, TimerId, TimerKind, TimerService};
