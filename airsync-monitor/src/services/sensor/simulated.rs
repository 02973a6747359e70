use std::f64::consts::PI;
use std::sync::Arc;

use airsync_api::time::{SystemClock, TimeProvider};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::errors::SensorError;

use super::{decode_identifier, RawValues, SensorDriver};

/// Number of reads during which the NOx algorithm reports NaN.
const NOX_WARMUP_READS: u32 = 3;

/// Sensor stand-in producing plausible values that follow the time of day.
///
/// Used when no hardware driver is available, e.g. on a development host.
pub struct SimulatedSensor {
    clock: Arc<dyn TimeProvider>,
    rng: StdRng,
    measuring: bool,
    reads: u32,
}

impl SimulatedSensor {
    pub fn new() -> Self {
        Self::with_parts(Arc::new(SystemClock::new()), StdRng::from_os_rng())
    }

    pub fn with_parts(clock: Arc<dyn TimeProvider>, rng: StdRng) -> Self {
        Self {
            clock,
            rng,
            measuring: false,
            reads: 0,
        }
    }

    pub fn seeded(clock: Arc<dyn TimeProvider>, seed: u64) -> Self {
        Self::with_parts(clock, StdRng::seed_from_u64(seed))
    }

    fn day_fraction(&self) -> f64 {
        let now = self.clock.now();
        let seconds = now.hour() as u32 * 3600 + now.minute() as u32 * 60 + now.second() as u32;

        seconds as f64 / 86400.0
    }
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SensorDriver for SimulatedSensor {
    async fn reset(&mut self) -> Result<(), SensorError> {
        self.measuring = false;
        self.reads = 0;
        Ok(())
    }

    async fn serial_number(&mut self) -> Result<String, SensorError> {
        let mut raw = [0u8; 32];
        raw[..16].copy_from_slice(b"SIM0000000000001");
        decode_identifier(&raw)
    }

    async fn product_name(&mut self) -> Result<String, SensorError> {
        let mut raw = [0u8; 32];
        raw[..5].copy_from_slice(b"SEN55");
        decode_identifier(&raw)
    }

    async fn start_measurement(&mut self) -> Result<(), SensorError> {
        self.measuring = true;
        Ok(())
    }

    async fn read_values(&mut self) -> Result<RawValues, SensorError> {
        if !self.measuring {
            return Err(SensorError::Driver {
                operation: "read_measured_values",
                code: -1,
            });
        }

        let day_fraction = self.day_fraction();
        let noise = self.rng.random_range(-1.0f64..1.0);

        let pm2_5 = (simulated_particulate(day_fraction) + noise * 2.0).max(0.0);
        let pm1_0 = pm2_5 * 0.8;
        let pm4_0 = pm2_5 * 1.1;
        let pm10_0 = pm2_5 * 1.2;
        let humidity = simulated_humidity(day_fraction) + noise;
        let temperature = simulated_temperature(day_fraction) + noise * 0.2;
        let voc = (100.0 + self.rng.random_range(-20.0f64..60.0)).round();
        let nox = if self.reads < NOX_WARMUP_READS {
            f64::NAN
        } else {
            self.rng.random_range(1.0..3.0f64).round()
        };

        self.reads += 1;

        Ok([pm1_0, pm2_5, pm4_0, pm10_0, humidity, temperature, voc, nox])
    }
}

/// Particulate load with a morning and an evening peak.
pub fn simulated_particulate(day_fraction: f64) -> f64 {
    let peak = |center: f64, width: f64| (-((day_fraction - center) / width).powi(2)).exp();

    6.0 + 30.0 * peak(0.32, 0.03) + 55.0 * peak(0.78, 0.04)
}

pub fn simulated_humidity(day_fraction: f64) -> f64 {
    let radians = day_fraction * 2.0 * PI;

    if (0.3..=0.7).contains(&day_fraction) {
        ((radians.sin().max(0.0) * 25.0) + 45.0).round()
    } else {
        ((radians.cos().max(0.0) * 20.0) + 40.0).round()
    }
}

pub fn simulated_temperature(day_fraction: f64) -> f64 {
    let radians = (day_fraction - 0.25) * 2.0 * PI;

    19.0 + radians.sin() * 3.0
}
