use serde::{Deserialize, Serialize};

use super::coordinator::OverlayHandle;
use super::theme::Theme;

pub const HEADLINE: &str = "Time to take a break!";
pub const DISMISS_LABEL: &str = "Dismiss";

/// What every overlay of a session shows at a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayView {
    pub remaining_seconds: u32,
    pub progress_ratio: f64,
    pub theme: Theme,
}

impl OverlayView {
    pub fn headline(&self) -> &'static str {
        HEADLINE
    }

    pub fn caption(&self) -> String {
        format!("Window will close in: {}s", self.remaining_seconds)
    }

    pub fn dismiss_label(&self) -> &'static str {
        DISMISS_LABEL
    }
}

/// Where overlays are actually drawn. A GUI shell opens one window per
/// handle; the CLI prints lines.
///
/// The coordinator guarantees that `update` and `close` are only called for
/// handles previously passed to `open`, and that `close` is called exactly
/// once per handle.
pub trait OverlaySurface {
    fn open(&mut self, overlay: &OverlayHandle, view: &OverlayView);
    fn update(&mut self, overlay: &OverlayHandle, view: &OverlayView);
    fn close(&mut self, overlay: &OverlayHandle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::Rgb;

    #[test]
    fn caption_shows_remaining_seconds() {
        let view = OverlayView {
            remaining_seconds: 42,
            progress_ratio: 0.7,
            theme: Theme::from_background(Rgb::BLACK),
        };
        assert_eq!(view.caption(), "Window will close in: 42s");
        assert_eq!(view.headline(), "Time to take a break!");
        assert_eq!(view.dismiss_label(), "Dismiss");
    }
}
