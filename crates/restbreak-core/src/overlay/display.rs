use serde::{Deserialize, Serialize};

/// Fraction of a display's work area an overlay covers, on each axis.
pub const OVERLAY_SCALE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// A rectangle scaled by `scale` on both axes, centered inside `self`.
    pub fn centered_fraction(&self, scale: f64) -> Rect {
        let width = self.width * scale;
        let height = self.height * scale;
        Rect {
            x: self.x + (self.width - width) / 2.0,
            y: self.y + (self.height - height) / 2.0,
            width,
            height,
        }
    }
}

/// A connected display and its visible work area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Display {
    pub id: String,
    pub work_area: Rect,
}

/// Enumerates the displays connected right now.
pub trait DisplayProvider {
    fn displays(&self) -> Vec<Display>;
}

/// A fixed display list, e.g. loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticDisplays(Vec<Display>);

impl StaticDisplays {
    pub fn new(displays: Vec<Display>) -> Self {
        Self(displays)
    }
}

impl DisplayProvider for StaticDisplays {
    fn displays(&self) -> Vec<Display> {
        self.0.clone()
    }
}
