//! Severity classification of channel values.
//!
//! Each channel family owns a fixed table of bands sorted by ascending upper
//! bound. A value belongs to the first band whose upper bound is strictly
//! greater than the value; anything at or above every finite bound (and NaN)
//! falls into the last band, so classification is total.

use serde::{Deserialize, Serialize};

use crate::models::Color;

/// One classification rule: values below `upper` get `color`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// Exclusive upper bound of the band
    pub upper: f64,
    /// Color of every value inside the band
    pub color: Color,
}

impl Band {
    const fn new(upper: f64, color: Color) -> Self {
        Self { upper, color }
    }
}

/// PM1.0 and PM2.5, in µg/m³.
const FINE_PARTICULATE: [Band; 6] = [
    Band::new(10.0, Color::GOOD),
    Band::new(20.0, Color::FAIR),
    Band::new(25.0, Color::MODERATE),
    Band::new(50.0, Color::POOR),
    Band::new(75.0, Color::VERY_POOR),
    Band::new(f64::INFINITY, Color::SEVERE),
];

/// PM4.0 and PM10.0, in µg/m³.
const COARSE_PARTICULATE: [Band; 6] = [
    Band::new(20.0, Color::GOOD),
    Band::new(40.0, Color::FAIR),
    Band::new(50.0, Color::MODERATE),
    Band::new(100.0, Color::POOR),
    Band::new(150.0, Color::VERY_POOR),
    Band::new(f64::INFINITY, Color::SEVERE),
];

/// VOC and NOx index points.
const GAS: [Band; 3] = [
    Band::new(249.0, Color::BLUE),
    Band::new(449.0, Color::GREEN),
    Band::new(f64::INFINITY, Color::RED),
];

/// Channels sharing one band table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    FineParticulate,
    CoarseParticulate,
    Gas,
}

impl Family {
    pub fn bands(self) -> &'static [Band] {
        match self {
            Family::FineParticulate => &FINE_PARTICULATE,
            Family::CoarseParticulate => &COARSE_PARTICULATE,
            Family::Gas => &GAS,
        }
    }

    /// Severity rank of `value`: the index of its band, 0 being the mildest.
    pub fn severity(self, value: f64) -> usize {
        let bands = self.bands();

        bands
            .iter()
            .position(|band| value < band.upper)
            .unwrap_or(bands.len() - 1)
    }

    pub fn band(self, value: f64) -> &'static Band {
        &self.bands()[self.severity(value)]
    }

    pub fn classify(self, value: f64) -> Color {
        self.band(value).color
    }
}

/// Color of `value` within `family`.
pub fn classify(family: Family, value: f64) -> Color {
    family.classify(value)
}
