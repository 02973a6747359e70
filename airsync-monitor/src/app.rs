use std::sync::Arc;

use airsync_api::time::{SystemClock, TimeProvider};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::configs::{ArtifactTarget, Settings, Telemetry};
use crate::errors::ConfigError;
use crate::services::*;

pub fn create_telemetry(settings: &Settings) -> Result<TelemetryPublisher, ConfigError> {
    let sink = match &settings.telemetry {
        Some(Telemetry::Webhook { url }) => {
            tracing::info!("posting telemetry to {}", url);
            TelemetrySink::Batch(Arc::new(WebhookSink::new(url.clone())))
        }
        Some(Telemetry::Mqtt(mqtt)) => {
            tracing::info!("publishing telemetry to {}:{} under {}", mqtt.host, mqtt.port, mqtt.base_topic);
            TelemetrySink::Channel(Arc::new(MqttSink::new(mqtt)))
        }
        None => return Err(ConfigError::MissingTelemetry),
    };

    Ok(TelemetryPublisher::new(sink, settings.sampler.timeout()))
}

pub fn create_artifacts(settings: &Settings) -> Option<ArtifactPublisher> {
    if !settings.artifacts.enabled {
        tracing::info!("chart publication disabled");
        return None;
    }

    let transport: Arc<dyn ArtifactTransport> = match &settings.artifacts.target {
        ArtifactTarget::Ssh { host, directory } => {
            tracing::info!("publishing charts to {}:{}", host, directory);
            Arc::new(SshTransport::new(host.clone(), directory.clone()))
        }
        ArtifactTarget::Local { directory } => {
            tracing::info!("publishing charts to {}", directory);
            Arc::new(LocalTransport::new(directory.clone()))
        }
    };

    Some(ArtifactPublisher::new(transport, settings.sampler.timeout()))
}

/// Wire the sampler from settings. Must be called inside the runtime.
pub async fn create_sampler(settings: &Arc<Settings>) -> Result<SamplerService, ConfigError> {
    settings.validate()?;

    let clock: Arc<dyn TimeProvider> = Arc::new(SystemClock::new());
    tracing::warn!("no hardware sensor driver available, sampling simulated readings");
    let driver = Box::new(SimulatedSensor::with_parts(clock.clone(), StdRng::from_os_rng()));

    let telemetry = create_telemetry(settings)?;
    let charts = ChartBuilder::new(Arc::new(PngRenderer::new(
        settings.chart.width,
        settings.chart.height,
    )));

    let sampler = SamplerService::new(driver, clock, telemetry, charts, &settings.sampler);

    Ok(match create_artifacts(settings) {
        Some(artifacts) => sampler.with_artifacts(artifacts),
        None => sampler,
    })
}
