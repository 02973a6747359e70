use async_trait::async_trait;
use reqwest::Client;

use crate::errors::PublishError;

use super::{BatchSink, TelemetryPayload};

/// Posts the aggregate payload as JSON to a fixed URL, e.g. a Home
/// Assistant webhook.
pub struct WebhookSink {
    client: Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl BatchSink for WebhookSink {
    async fn send(&self, payload: &TelemetryPayload) -> Result<(), PublishError> {
        let response = self.client.post(&self.url).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Rejected(status.as_u16()));
        }

        tracing::debug!("posted telemetry to {} ({})", self.url, status);

        Ok(())
    }
}
