use core::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::Family;

/// An opaque 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    // Severity progression for particulate matter
    pub const GOOD: Color = Color::new(55, 172, 86);
    pub const FAIR: Color = Color::new(155, 212, 68);
    pub const MODERATE: Color = Color::new(241, 210, 8);
    pub const POOR: Color = Color::new(255, 187, 1);
    pub const VERY_POOR: Color = Color::new(255, 140, 0);
    pub const SEVERE: Color = Color::new(237, 15, 5);

    // Plain chart colors, also used for the gas index bands
    pub const BLUE: Color = Color::new(0, 116, 217);
    pub const GREEN: Color = Color::new(0, 217, 101);
    pub const RED: Color = Color::new(217, 0, 101);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Point coloring rule of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    /// Each point is colored by the severity band of its value
    Classified(Family),
    /// Every point uses the same color
    Constant(Color),
}

impl Palette {
    pub fn color_of(&self, value: f64) -> Color {
        match self {
            Palette::Classified(family) => family.classify(value),
            Palette::Constant(color) => *color,
        }
    }
}
