//! Overlay colors.
//!
//! One theme per break session: a uniformly random background and a
//! foreground picked by a plain brightness threshold.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Background brightness below this gets a white foreground.
const WHITE_TEXT_BELOW: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.gen(), rng.gen(), rng.gen())
    }

    /// HSB brightness: the largest channel, in 0.0..=1.0.
    pub fn brightness(&self) -> f64 {
        f64::from(self.r.max(self.g).max(self.b)) / 255.0
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub background: Rgb,
    pub foreground: Rgb,
}

impl Theme {
    pub fn from_background(background: Rgb) -> Self {
        Self {
            background,
            foreground: foreground_for_brightness(background.brightness()),
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_background(Rgb::random(rng))
    }
}

/// White on dark backgrounds, black otherwise. Exactly 0.5 counts as light.
pub fn foreground_for_brightness(brightness: f64) -> Rgb {
    if brightness < WHITE_TEXT_BELOW {
        Rgb::WHITE
    } else {
        Rgb::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    #[test]
    fn threshold_is_inclusive_on_the_black_side() {
        assert_eq!(foreground_for_brightness(0.5), Rgb::BLACK);
        assert_eq!(foreground_for_brightness(0.4999), Rgb::WHITE);
        assert_eq!(foreground_for_brightness(0.0), Rgb::WHITE);
        assert_eq!(foreground_for_brightness(1.0), Rgb::BLACK);
    }

    #[test]
    fn brightness_is_max_channel() {
        assert_eq!(Rgb::new(0, 0, 0).brightness(), 0.0);
        assert_eq!(Rgb::new(10, 255, 3).brightness(), 1.0);
        assert_eq!(Rgb::new(51, 0, 0).brightness(), 0.2);
    }

    #[test]
    fn dark_and_light_backgrounds() {
        assert_eq!(
            Theme::from_background(Rgb::new(20, 30, 120)).foreground,
            Rgb::WHITE
        );
        assert_eq!(
            Theme::from_background(Rgb::new(250, 200, 10)).foreground,
            Rgb::BLACK
        );
    }

    #[test]
    fn same_seed_same_theme() {
        let a = Theme::random(&mut Mcg128Xsl64::seed_from_u64(42));
        let b = Theme::random(&mut Mcg128Xsl64::seed_from_u64(42));
        assert_eq!(a, b);
        assert_eq!(a.foreground, foreground_for_brightness(a.background.brightness()));
    }

    #[test]
    fn renders_as_hex() {
        assert_eq!(Rgb::new(255, 8, 0).to_string(), "#ff0800");
    }
}
