use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("Sensor {operation} failed with code {code}")]
    Driver { operation: &'static str, code: i32 },

    #[error("Sensor {operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Sensor returned malformed {0}")]
    Malformed(&'static str),
}
