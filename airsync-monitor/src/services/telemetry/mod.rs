mod mqtt;
mod webhook;

pub use mqtt::*;
pub use webhook::*;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use airsync_api::{Channel, Reading};
use async_trait::async_trait;
use serde::Serialize;

use crate::errors::PublishError;

/// Aggregate payload: one one-decimal string per channel, keyed by JSON key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TelemetryPayload(BTreeMap<&'static str, String>);

impl TelemetryPayload {
    pub fn from_reading(reading: &Reading) -> Self {
        Self(
            Channel::ALL
                .into_iter()
                .map(|channel| (channel.json_key(), reading.formatted(channel)))
                .collect(),
        )
    }

    pub fn get(&self, channel: Channel) -> Option<&str> {
        self.0.get(channel.json_key()).map(String::as_str)
    }
}

/// Sink accepting a whole reading in one message.
#[async_trait]
pub trait BatchSink: Send + Sync {
    async fn send(&self, payload: &TelemetryPayload) -> Result<(), PublishError>;
}

/// Sink accepting one message per channel.
#[async_trait]
pub trait ChannelSink: Send + Sync {
    /// Describe `channel` to the sink; called once per channel at startup.
    async fn announce(&self, channel: Channel) -> Result<(), PublishError>;

    async fn send(&self, channel: Channel, value: &str) -> Result<(), PublishError>;
}

#[derive(Clone)]
pub enum TelemetrySink {
    Batch(Arc<dyn BatchSink>),
    Channel(Arc<dyn ChannelSink>),
}

/// Outcome of publishing one reading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub attempted: Vec<Channel>,
    pub failed: Vec<Channel>,
}

impl PublishReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct TelemetryPublisher {
    sink: TelemetrySink,
    timeout: Duration,
}

impl TelemetryPublisher {
    pub fn new(sink: TelemetrySink, timeout: Duration) -> Self {
        Self { sink, timeout }
    }

    /// Register every channel with a per-channel sink. Failures are logged.
    pub async fn announce(&self) {
        let TelemetrySink::Channel(sink) = &self.sink else {
            return;
        };

        for channel in Channel::ALL {
            match self.bounded(sink.announce(channel)).await {
                Ok(()) => tracing::debug!(channel = %channel, "announced telemetry channel"),
                Err(e) => tracing::error!(channel = %channel, "Failed to announce channel: {}", e),
            }
        }
    }

    /// Send every channel of `reading`. A failed channel never stops the others.
    pub async fn publish(&self, reading: &Reading) -> PublishReport {
        let mut report = PublishReport::default();

        match &self.sink {
            TelemetrySink::Batch(sink) => {
                let payload = TelemetryPayload::from_reading(reading);
                report.attempted.extend(Channel::ALL);

                if let Err(e) = self.bounded(sink.send(&payload)).await {
                    tracing::error!("Failed to post telemetry: {}", e);
                    report.failed.extend(Channel::ALL);
                }
            }
            TelemetrySink::Channel(sink) => {
                for channel in Channel::ALL {
                    let value = reading.formatted(channel);
                    report.attempted.push(channel);

                    if let Err(e) = self.bounded(sink.send(channel, &value)).await {
                        tracing::error!(channel = %channel, "Failed to publish telemetry: {}", e);
                        report.failed.push(channel);
                    }
                }
            }
        }

        report
    }

    async fn bounded<F>(&self, call: F) -> Result<(), PublishError>
    where
        F: Future<Output = Result<(), PublishError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or(Err(PublishError::Timeout(self.timeout)))
    }
}
