use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::classify::Family;

use super::{Color, Palette};

/// A single quantity measured by the sensor.
///
/// The declaration order is the order in which the sensor reports its values
/// and the order in which every per-channel loop in the workspace runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Mass concentration of particles below 1.0 µm
    Pm1p0,
    /// Mass concentration of particles below 2.5 µm
    Pm2p5,
    /// Mass concentration of particles below 4.0 µm
    Pm4p0,
    /// Mass concentration of particles below 10.0 µm
    Pm10p0,
    /// Relative humidity
    Humidity,
    /// Ambient temperature
    Temperature,
    /// VOC index reported by the sensor algorithm
    Voc,
    /// NOx index reported by the sensor algorithm
    Nox,
}

impl Channel {
    pub const COUNT: usize = 8;

    pub const ALL: [Channel; Channel::COUNT] = [
        Channel::Pm1p0,
        Channel::Pm2p5,
        Channel::Pm4p0,
        Channel::Pm10p0,
        Channel::Humidity,
        Channel::Temperature,
        Channel::Voc,
        Channel::Nox,
    ];

    /// Position of the channel in [`Channel::ALL`] and in the sensor tuple.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short identifier used in artifact names and topic paths.
    pub const fn id(self) -> &'static str {
        match self {
            Channel::Pm1p0 => "pm1p0",
            Channel::Pm2p5 => "pm2p5",
            Channel::Pm4p0 => "pm4p0",
            Channel::Pm10p0 => "pm10p0",
            Channel::Humidity => "humidity",
            Channel::Temperature => "temperature",
            Channel::Voc => "voc",
            Channel::Nox => "nox",
        }
    }

    /// Display name used as chart title and discovery name.
    pub const fn title(self) -> &'static str {
        match self {
            Channel::Pm1p0 => "PM1.0",
            Channel::Pm2p5 => "PM2.5",
            Channel::Pm4p0 => "PM4.0",
            Channel::Pm10p0 => "PM10.0",
            Channel::Humidity => "Humidity",
            Channel::Temperature => "Temperature",
            Channel::Voc => "VOC",
            Channel::Nox => "NOX",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Channel::Pm1p0 | Channel::Pm2p5 | Channel::Pm4p0 | Channel::Pm10p0 => "µg/m³",
            Channel::Humidity => "%",
            Channel::Temperature => "°C",
            Channel::Voc | Channel::Nox => "index",
        }
    }

    /// Key of the channel in the aggregate webhook payload.
    pub const fn json_key(self) -> &'static str {
        match self {
            Channel::Pm1p0 => "mass_concentration_pm1p0",
            Channel::Pm2p5 => "mass_concentration_pm2p5",
            Channel::Pm4p0 => "mass_concentration_pm4p0",
            Channel::Pm10p0 => "mass_concentration_pm10p0",
            Channel::Humidity => "ambient_humidity",
            Channel::Temperature => "ambient_temperature",
            Channel::Voc => "voc_index",
            Channel::Nox => "nox_index",
        }
    }

    /// Home Assistant device class, when one matches the quantity.
    pub const fn device_class(self) -> Option<&'static str> {
        match self {
            Channel::Pm1p0 => Some("pm1"),
            Channel::Pm2p5 => Some("pm25"),
            Channel::Pm10p0 => Some("pm10"),
            Channel::Humidity => Some("humidity"),
            Channel::Temperature => Some("temperature"),
            Channel::Pm4p0 | Channel::Voc | Channel::Nox => None,
        }
    }

    /// How the points of this channel are colored on a chart.
    pub const fn palette(self) -> Palette {
        match self {
            Channel::Pm1p0 | Channel::Pm2p5 => Palette::Classified(Family::FineParticulate),
            Channel::Pm4p0 | Channel::Pm10p0 => Palette::Classified(Family::CoarseParticulate),
            Channel::Humidity | Channel::Temperature => Palette::Constant(Color::BLUE),
            Channel::Voc | Channel::Nox => Palette::Classified(Family::Gas),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChannel(pub String);

impl fmt::Display for UnknownChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown channel: {}", self.0)
    }
}

impl std::error::Error for UnknownChannel {}

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|channel| channel.id() == s)
            .ok_or_else(|| UnknownChannel(s.to_string()))
    }
}
