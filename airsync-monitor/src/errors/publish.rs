use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Endpoint rejected telemetry with status {0}")]
    Rejected(u16),

    #[error("MQTT publish failed: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    #[error("Failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Telemetry send timed out after {0:?}")]
    Timeout(Duration),
}
