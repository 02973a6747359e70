use std::time::Duration;

use airsync_api::Channel;
use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::configs::Mqtt;
use crate::errors::PublishError;

use super::ChannelSink;

/// Home Assistant style discovery document for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discovery {
    pub name: &'static str,
    pub unique_id: String,
    pub unit_of_measurement: &'static str,
    pub state_topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<&'static str>,
    pub state_class: &'static str,
}

/// Topic layout under a configurable base topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicLayout {
    base_topic: String,
}

impl TopicLayout {
    pub fn new(base_topic: &str) -> Self {
        Self {
            base_topic: base_topic.trim_end_matches('/').to_string(),
        }
    }

    pub fn config_topic(&self, channel: Channel) -> String {
        format!("{}/{}/config", self.base_topic, channel.id())
    }

    pub fn state_topic(&self, channel: Channel) -> String {
        format!("{}/{}/state", self.base_topic, channel.id())
    }

    pub fn discovery(&self, channel: Channel, client_id: &str) -> Discovery {
        Discovery {
            name: channel.title(),
            unique_id: format!("{}_{}", client_id, channel.id()),
            unit_of_measurement: channel.unit(),
            state_topic: self.state_topic(channel),
            device_class: channel.device_class(),
            state_class: "measurement",
        }
    }
}

/// Publishes retained per-channel state messages to an MQTT broker.
pub struct MqttSink {
    client: AsyncClient,
    layout: TopicLayout,
    client_id: String,
    /// `None` when the event loop is driven elsewhere
    event_task: Option<JoinHandle<()>>,
}

impl MqttSink {
    pub fn new(settings: &Mqtt) -> Self {
        let mut options = MqttOptions::new(&settings.client_id, &settings.host, settings.port);
        options.set_keep_alive(Duration::from_secs(5));

        if let Some(username) = &settings.username {
            options.set_credentials(username, settings.password.clone().unwrap_or_default());
        }

        let (client, event_loop) = AsyncClient::new(options, 10);

        let mut sink = Self::with_client(client, &settings.base_topic, &settings.client_id);
        sink.event_task = Some(tokio::spawn(Self::drive(event_loop)));
        sink
    }

    /// Publish through an existing client whose event loop the caller polls.
    pub fn with_client(client: AsyncClient, base_topic: &str, client_id: &str) -> Self {
        Self {
            client,
            layout: TopicLayout::new(base_topic),
            client_id: client_id.to_string(),
            event_task: None,
        }
    }

    /// Poll the connection so queued publishes are flushed; rumqttc
    /// reconnects on the next poll after an error.
    async fn drive(mut event_loop: EventLoop) {
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    tracing::info!("connected to MQTT broker: {:?}", ack.code);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("MQTT error: {}", e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    async fn publish_retained(&self, topic: String, payload: Vec<u8>) -> Result<(), PublishError> {
        tracing::debug!("publish {} ({} bytes)", topic, payload.len());

        self.client
            .publish(topic, QoS::AtLeastOnce, true, payload)
            .await?;

        Ok(())
    }
}

impl Drop for MqttSink {
    fn drop(&mut self) {
        if let Some(task) = &self.event_task {
            task.abort();
        }
    }
}

#[async_trait]
impl ChannelSink for MqttSink {
    async fn announce(&self, channel: Channel) -> Result<(), PublishError> {
        let discovery = self.layout.discovery(channel, &self.client_id);
        let payload = serde_json::to_vec(&discovery)?;

        self.publish_retained(self.layout.config_topic(channel), payload).await
    }

    async fn send(&self, channel: Channel, value: &str) -> Result<(), PublishError> {
        self.publish_retained(self.layout.state_topic(channel), value.as_bytes().to_vec())
            .await
    }
}
