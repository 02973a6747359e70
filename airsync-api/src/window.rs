//! Rolling window of readings for the current hour-of-day run.
//!
//! The window keeps one sequence per channel, index-aligned to a shared
//! timestamp sequence. It is cleared whenever a new sample's hour-of-day is
//! strictly lower than the previous sample's; the date is ignored, so both a
//! midnight rollover and a backward clock adjustment reset it.

use time::OffsetDateTime;

use crate::models::{Channel, Reading};

/// Read-only view of one channel, valid until the next append.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Series<'a> {
    pub channel: Channel,
    pub timestamps: &'a [OffsetDateTime],
    pub values: &'a [f64],
}

impl Series<'_> {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct WindowBuffer {
    timestamps: Vec<OffsetDateTime>,
    values: [Vec<f64>; Channel::COUNT],
    last_hour: Option<u8>,
}

impl WindowBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reading to every channel at once.
    ///
    /// Returns `true` when the window was cleared before the append.
    pub fn append(&mut self, reading: &Reading) -> bool {
        let hour = reading.timestamp.hour();
        let rolled_over = self.last_hour.is_some_and(|last| hour < last);

        if rolled_over {
            self.clear();
        }

        self.last_hour = Some(hour);
        self.timestamps.push(reading.timestamp);
        for channel in Channel::ALL {
            self.values[channel.index()].push(reading.value(channel));
        }

        rolled_over
    }

    pub fn snapshot(&self, channel: Channel) -> Series<'_> {
        Series {
            channel,
            timestamps: &self.timestamps,
            values: &self.values[channel.index()],
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Hour-of-day of the most recent sample, if any was recorded.
    pub fn last_hour(&self) -> Option<u8> {
        self.last_hour
    }

    fn clear(&mut self) {
        self.timestamps.clear();
        self.values.iter_mut().for_each(Vec::clear);
    }
}
