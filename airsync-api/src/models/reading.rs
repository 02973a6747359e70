use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Channel;

/// Snapshot of every channel taken at one sample time.
///
/// Readings are only built through [`Reading::new`], which replaces a NaN
/// NOx index (reported while the sensor algorithm warms up) with `0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Sample time
    pub timestamp: OffsetDateTime,
    /// PM1.0 mass concentration in µg/m³
    pub pm1_0: f64,
    /// PM2.5 mass concentration in µg/m³
    pub pm2_5: f64,
    /// PM4.0 mass concentration in µg/m³
    pub pm4_0: f64,
    /// PM10.0 mass concentration in µg/m³
    pub pm10_0: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    /// Temperature in Celsius
    pub temperature: f64,
    /// VOC index
    pub voc_index: f64,
    /// NOx index, never NaN
    pub nox_index: f64,
}

impl Reading {
    /// Build a reading from the raw sensor tuple, in [`Channel::ALL`] order.
    pub fn new(timestamp: OffsetDateTime, values: [f64; Channel::COUNT]) -> Self {
        let [pm1_0, pm2_5, pm4_0, pm10_0, humidity, temperature, voc_index, nox_index] = values;

        Self {
            timestamp,
            pm1_0,
            pm2_5,
            pm4_0,
            pm10_0,
            humidity,
            temperature,
            voc_index,
            nox_index: if nox_index.is_nan() { 0.0 } else { nox_index },
        }
    }

    pub fn value(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Pm1p0 => self.pm1_0,
            Channel::Pm2p5 => self.pm2_5,
            Channel::Pm4p0 => self.pm4_0,
            Channel::Pm10p0 => self.pm10_0,
            Channel::Humidity => self.humidity,
            Channel::Temperature => self.temperature,
            Channel::Voc => self.voc_index,
            Channel::Nox => self.nox_index,
        }
    }

    pub fn values(&self) -> [f64; Channel::COUNT] {
        Channel::ALL.map(|channel| self.value(channel))
    }

    /// Value of `channel` with exactly one decimal place, e.g. `"23.4"`.
    pub fn formatted(&self, channel: Channel) -> String {
        format!("{:.1}", self.value(channel))
    }
}
