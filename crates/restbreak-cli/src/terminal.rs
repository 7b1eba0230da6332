//! Overlay surface that prints to a terminal.
//!
//! Every overlay of a session shows the same view, so a countdown step is
//! printed once rather than once per display.

use std::fmt;
use std::io::Write;

use restbreak_core::{OverlayHandle, OverlaySurface, OverlayView};
use tracing::warn;

const BAR_WIDTH: usize = 20;

pub struct TerminalSurface<W> {
    out: W,
    last_remaining: Option<u32>,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_remaining: None,
        }
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        let written = self
            .out
            .write_fmt(args)
            .and_then(|()| self.out.write_all(b"\n"))
            .and_then(|()| self.out.flush());
        if let Err(e) = written {
            warn!(error = %e, "failed to write overlay output");
        }
    }
}

/// `[#####---------------]` style bar for a ratio in `[0, 1]`.
pub fn progress_bar(ratio: f64) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

impl<W: Write> OverlaySurface for TerminalSurface<W> {
    fn open(&mut self, overlay: &OverlayHandle, view: &OverlayView) {
        let frame = overlay.frame();
        self.line(format_args!(
            "[{}] {}  ({:.0}x{:.0} at {:.0},{:.0}, {} on {})  [{}]",
            overlay.display_id(),
            view.headline(),
            frame.width,
            frame.height,
            frame.x,
            frame.y,
            view.theme.foreground,
            view.theme.background,
            view.dismiss_label(),
        ));
        self.last_remaining = None;
    }

    fn update(&mut self, _overlay: &OverlayHandle, view: &OverlayView) {
        if self.last_remaining == Some(view.remaining_seconds) {
            return;
        }
        self.last_remaining = Some(view.remaining_seconds);
        self.line(format_args!(
            "{} {}",
            progress_bar(view.progress_ratio),
            view.caption()
        ));
    }

    fn close(&mut self, overlay: &OverlayHandle) {
        self.line(format_args!("[{}] overlay closed", overlay.display_id()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restbreak_core::{
        Display, EndReason, ManualTimers, OverlayCoordinator, Rect, StaticDisplays, TimerKind,
    };

    fn display(id: &str) -> Display {
        Display {
            id: id.into(),
            work_area: Rect {
                x: 0.0,
                y: 0.0,
                width: 1000.0,
                height: 500.0,
            },
        }
    }

    fn printed(coord: &OverlayCoordinator<StaticDisplays, TerminalSurface<Vec<u8>>>) -> Vec<String> {
        String::from_utf8_lossy(coord.surface().output())
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(1.0), format!("[{}]", "#".repeat(20)));
        assert_eq!(progress_bar(0.0), format!("[{}]", "-".repeat(20)));
        assert_eq!(progress_bar(0.5), format!("[{}{}]", "#".repeat(10), "-".repeat(10)));
        assert_eq!(progress_bar(7.0), progress_bar(1.0));
    }

    #[test]
    fn prints_one_line_per_overlay_and_one_per_tick() {
        let displays = StaticDisplays::new(vec![display("left"), display("right")]);
        let mut coord = OverlayCoordinator::new(displays, TerminalSurface::new(Vec::new()), Some(1));
        let mut timers = ManualTimers::new();
        coord.start_session(&mut timers, 10);
        let countdown = timers.only(TimerKind::Countdown).unwrap();
        coord.on_countdown_fire(&mut timers, countdown);
        coord.dismiss_session(&mut timers, EndReason::Dismissed);

        let lines = printed(&coord);
        assert_eq!(lines.len(), 5, "{lines:?}");
        assert!(lines[0].starts_with("[left] Time to take a break!  (700x350 at 150,75"));
        assert!(lines[0].ends_with("[Dismiss]"));
        assert!(lines[1].starts_with("[right] "));
        assert!(lines[2].ends_with("Window will close in: 9s"));
        assert_eq!(lines[3], "[left] overlay closed");
        assert_eq!(lines[4], "[right] overlay closed");
    }
}
