mod simulated;

pub use simulated::*;

use airsync_api::Channel;
use async_trait::async_trait;

use crate::errors::SensorError;

/// Raw values in [`Channel::ALL`] order.
pub type RawValues = [f64; Channel::COUNT];

/// Command set of a SEN5x-class environmental sensor.
///
/// Bus-level details belong to the implementation; every call either
/// completes or reports a [`SensorError`].
#[async_trait]
pub trait SensorDriver: Send {
    async fn reset(&mut self) -> Result<(), SensorError>;

    async fn serial_number(&mut self) -> Result<String, SensorError>;

    async fn product_name(&mut self) -> Result<String, SensorError>;

    async fn start_measurement(&mut self) -> Result<(), SensorError>;

    async fn read_values(&mut self) -> Result<RawValues, SensorError>;
}

/// Decode a NUL padded identifier string as returned by the sensor.
pub fn decode_identifier(raw: &[u8]) -> Result<String, SensorError> {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());

    std::str::from_utf8(&raw[..end])
        .map(|s| s.trim().to_string())
        .map_err(|_| SensorError::Malformed("identifier"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_identifier_stops_at_nul() {
        let mut raw = [0u8; 32];
        raw[..5].copy_from_slice(b"SEN55");

        assert_eq!(decode_identifier(&raw).unwrap(), "SEN55");
        assert_eq!(decode_identifier(b"ABC123").unwrap(), "ABC123");
        assert!(decode_identifier(&[0xff, 0xfe, 0]).is_err());
    }
}
