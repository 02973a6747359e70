//! Periodic acquisition loop: read, window, telemetry, charts, artifacts.

use std::sync::Arc;
use std::time::Duration;

use airsync_api::time::TimeProvider;
use airsync_api::{Channel, Reading, WindowBuffer};
use futures::future::join_all;
use tokio::time::MissedTickBehavior;

use crate::configs::Sampler;
use crate::errors::SensorError;

use super::{ArtifactOutcome, ArtifactPublisher, ChartBuilder, PublishReport, SensorDriver, TelemetryPublisher, date_stamp};

/// What happened to one channel's chart during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartOutcome {
    pub channel: Channel,
    pub rendered: bool,
    /// `None` when rendering failed or publication is disabled
    pub artifact: Option<ArtifactOutcome>,
}

#[derive(Debug, Clone)]
pub struct TickReport {
    pub reading: Reading,
    pub rolled_over: bool,
    pub telemetry: PublishReport,
    pub charts: Vec<ChartOutcome>,
}

pub struct SamplerService {
    driver: Box<dyn SensorDriver>,
    clock: Arc<dyn TimeProvider>,
    window: WindowBuffer,
    telemetry: TelemetryPublisher,
    charts: ChartBuilder,
    artifacts: Option<ArtifactPublisher>,
    interval: Duration,
    warmup: Duration,
    timeout: Duration,
}

impl std::fmt::Debug for SamplerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SamplerService")
            .field("interval", &self.interval)
            .field("warmup", &self.warmup)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

async fn bounded<T, F>(timeout: Duration, operation: &'static str, call: F) -> Result<T, SensorError>
where
    F: Future<Output = Result<T, SensorError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(SensorError::Timeout { operation, timeout }))
}

impl SamplerService {
    pub fn new(
        driver: Box<dyn SensorDriver>,
        clock: Arc<dyn TimeProvider>,
        telemetry: TelemetryPublisher,
        charts: ChartBuilder,
        settings: &Sampler,
    ) -> Self {
        Self {
            driver,
            clock,
            window: WindowBuffer::new(),
            telemetry,
            charts,
            artifacts: None,
            interval: settings.interval(),
            warmup: settings.warmup(),
            timeout: settings.timeout(),
        }
    }

    pub fn with_artifacts(mut self, artifacts: ArtifactPublisher) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    pub fn window(&self) -> &WindowBuffer {
        &self.window
    }

    /// Bring the sensor into measurement mode and announce telemetry channels.
    ///
    /// Every step is attempted; failures are only logged.
    pub async fn initialize(&mut self) {
        let timeout = self.timeout;

        match bounded(timeout, "reset", self.driver.reset()).await {
            Ok(()) => tracing::info!("sensor reset"),
            Err(e) => tracing::error!("Failed to reset sensor: {}", e),
        }

        match bounded(timeout, "serial_number", self.driver.serial_number()).await {
            Ok(serial) => tracing::info!(serial = %serial, "sensor serial number"),
            Err(e) => tracing::error!("Failed to read serial number: {}", e),
        }

        match bounded(timeout, "product_name", self.driver.product_name()).await {
            Ok(product) => tracing::info!(product = %product, "sensor product name"),
            Err(e) => tracing::error!("Failed to read product name: {}", e),
        }

        match bounded(timeout, "start_measurement", self.driver.start_measurement()).await {
            Ok(()) => tracing::info!("measurement started"),
            Err(e) => tracing::error!("Failed to start measurement: {}", e),
        }

        self.telemetry.announce().await;
    }

    /// Run one full cycle. A sensor failure skips everything after the read.
    pub async fn tick(&mut self) -> Result<TickReport, SensorError> {
        let values = bounded(self.timeout, "read_values", self.driver.read_values())
            .await
            .inspect_err(|e| tracing::error!("Failed to read sensor values: {}", e))?;

        let reading = Reading::new(self.clock.now(), values);
        for channel in Channel::ALL {
            tracing::info!(
                channel = %channel,
                "{}: {} {}",
                channel.title(),
                reading.formatted(channel),
                channel.unit()
            );
        }

        let rolled_over = self.window.append(&reading);
        if rolled_over {
            tracing::warn!(hour = reading.timestamp.hour(), "hour rolled back, window restarted");
        }

        let telemetry = self.telemetry.publish(&reading).await;
        if !telemetry.is_complete() {
            tracing::warn!(
                "telemetry incomplete: {} of {} channels failed",
                telemetry.failed.len(),
                telemetry.attempted.len()
            );
        }

        let charts = self.publish_charts(&date_stamp(reading.timestamp)).await;

        Ok(TickReport {
            reading,
            rolled_over,
            telemetry,
            charts,
        })
    }

    async fn publish_charts(&self, date: &str) -> Vec<ChartOutcome> {
        join_all(Channel::ALL.map(|channel| self.publish_chart(channel, date))).await
    }

    async fn publish_chart(&self, channel: Channel, date: &str) -> ChartOutcome {
        let bytes = match self.charts.build(&self.window, channel) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(channel = %channel, "Failed to render chart: {}", e);
                return ChartOutcome {
                    channel,
                    rendered: false,
                    artifact: None,
                };
            }
        };

        let artifact = match &self.artifacts {
            Some(publisher) => Some(publisher.publish(channel, date, &bytes).await),
            None => None,
        };

        ChartOutcome {
            channel,
            rendered: true,
            artifact,
        }
    }

    /// Initialize, wait for warm-up, then tick every interval until `shutdown`
    /// resolves. A tick in progress always runs to completion.
    pub async fn run<S>(&mut self, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        self.initialize().await;

        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("shutdown requested during warm-up");
                return;
            }
            _ = tokio::time::sleep(self.warmup) => {}
        }

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("sampling every {:?}", self.interval);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("sampler stopped");
                    break;
                }
                _ = ticker.tick() => {
                    // Failures are already logged, the next tick retries
                    let _ = self.tick().await;
                }
            }
        }
    }
}
