#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use airsync_api::Channel;
use airsync_api::time::TimeProvider;
use airsync_monitor::configs::Sampler;
use airsync_monitor::errors::{PublishError, RenderError, SensorError, TransportError};
use airsync_monitor::services::*;
use async_trait::async_trait;
use time::OffsetDateTime;
use time::macros::datetime;

pub const SAMPLE_VALUES: RawValues = [1.5, 2.5, 3.5, 4.5, 41.26, 21.04, 100.0, 1.0];

pub fn sampler_settings() -> Sampler {
    Sampler {
        interval_secs: 60,
        warmup_secs: 1,
        timeout_secs: 20,
    }
}

pub struct FixedClock(Mutex<OffsetDateTime>);

impl FixedClock {
    pub fn new(now: OffsetDateTime) -> Self {
        Self(Mutex::new(now))
    }

    pub fn set(&self, now: OffsetDateTime) {
        *self.0.lock().unwrap() = now;
    }
}

impl TimeProvider for FixedClock {
    fn now(&self) -> OffsetDateTime {
        *self.0.lock().unwrap()
    }
}

#[derive(Default)]
pub struct MockSensorState {
    pub calls: Vec<&'static str>,
    pub queued: VecDeque<Result<RawValues, SensorError>>,
    pub failing: Vec<&'static str>,
    pub hang_reads: bool,
}

/// Scripted sensor; shares its state with the test through `state`.
#[derive(Clone, Default)]
pub struct MockSensor {
    pub state: Arc<Mutex<MockSensorState>>,
}

impl MockSensor {
    pub fn queue(&self, result: Result<RawValues, SensorError>) {
        self.state.lock().unwrap().queued.push_back(result);
    }

    pub fn fail(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.push(operation);
    }

    pub fn hang_reads(&self) {
        self.state.lock().unwrap().hang_reads = true;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn reads(&self) -> usize {
        self.calls().iter().filter(|&&c| c == "read_values").count()
    }

    fn record(&self, operation: &'static str) -> Result<(), SensorError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(operation);

        if state.failing.contains(&operation) {
            return Err(SensorError::Driver { operation, code: 5 });
        }
        Ok(())
    }
}

#[async_trait]
impl SensorDriver for MockSensor {
    async fn reset(&mut self) -> Result<(), SensorError> {
        self.record("reset")
    }

    async fn serial_number(&mut self) -> Result<String, SensorError> {
        self.record("serial_number").map(|_| String::from("MOCK0001"))
    }

    async fn product_name(&mut self) -> Result<String, SensorError> {
        self.record("product_name").map(|_| String::from("SEN55"))
    }

    async fn start_measurement(&mut self) -> Result<(), SensorError> {
        self.record("start_measurement")
    }

    async fn read_values(&mut self) -> Result<RawValues, SensorError> {
        self.record("read_values")?;

        let (hang, queued) = {
            let mut state = self.state.lock().unwrap();
            (state.hang_reads, state.queued.pop_front())
        };

        if hang {
            std::future::pending::<()>().await;
        }

        queued.unwrap_or(Ok(SAMPLE_VALUES))
    }
}

/// Per-channel sink recording every attempt; `failing` channels error out.
#[derive(Default)]
pub struct RecordingChannelSink {
    pub announced: Mutex<Vec<Channel>>,
    pub attempts: Mutex<Vec<(Channel, String)>>,
    pub failing: Option<Channel>,
    pub hang: bool,
}

impl RecordingChannelSink {
    pub fn failing(channel: Channel) -> Self {
        Self {
            failing: Some(channel),
            ..Self::default()
        }
    }

    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> Vec<(Channel, String)> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelSink for RecordingChannelSink {
    async fn announce(&self, channel: Channel) -> Result<(), PublishError> {
        self.announced.lock().unwrap().push(channel);
        Ok(())
    }

    async fn send(&self, channel: Channel, value: &str) -> Result<(), PublishError> {
        self.attempts.lock().unwrap().push((channel, value.to_string()));

        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.failing == Some(channel) {
            return Err(PublishError::Rejected(503));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingBatchSink {
    pub payloads: Mutex<Vec<TelemetryPayload>>,
    pub reject: bool,
}

#[async_trait]
impl BatchSink for RecordingBatchSink {
    async fn send(&self, payload: &TelemetryPayload) -> Result<(), PublishError> {
        self.payloads.lock().unwrap().push(payload.clone());

        if self.reject {
            return Err(PublishError::Rejected(500));
        }
        Ok(())
    }
}

/// Renders `chart:<id>:<points>` instead of an image.
#[derive(Default)]
pub struct MockRenderer {
    pub rendered: Mutex<Vec<(Channel, usize)>>,
    pub failing: Option<Channel>,
}

impl ChartRenderer for MockRenderer {
    fn render(&self, chart: &ChartSpec<'_>) -> Result<Vec<u8>, RenderError> {
        self.rendered.lock().unwrap().push((chart.channel, chart.len()));

        if self.failing == Some(chart.channel) {
            return Err(RenderError::CanvasTooSmall { width: 0, height: 0 });
        }
        Ok(format!("chart:{}:{}", chart.channel.id(), chart.len()).into_bytes())
    }
}

/// In-memory transport; names starting with a `failing_*` prefix error out.
#[derive(Default)]
pub struct MockTransport {
    pub stored: Mutex<Vec<(String, Vec<u8>)>>,
    pub staged_paths: Mutex<Vec<PathBuf>>,
    pub aliases: Mutex<Vec<(String, String)>>,
    pub failing_store: Option<&'static str>,
    pub failing_alias: Option<&'static str>,
    pub hang: bool,
}

impl MockTransport {
    pub fn stored_names(&self) -> Vec<String> {
        self.stored.lock().unwrap().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn aliases(&self) -> Vec<(String, String)> {
        self.aliases.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactTransport for MockTransport {
    async fn store(&self, staged: &Path, name: &str) -> Result<(), TransportError> {
        self.staged_paths.lock().unwrap().push(staged.to_path_buf());

        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.failing_store.is_some_and(|prefix| name.starts_with(prefix)) {
            return Err(TransportError::Io(std::io::Error::other("disk full")));
        }

        let bytes = std::fs::read(staged)?;
        self.stored.lock().unwrap().push((name.to_string(), bytes));
        Ok(())
    }

    async fn symlink(&self, name: &str, alias: &str) -> Result<(), TransportError> {
        if self.failing_alias.is_some_and(|prefix| alias.starts_with(prefix)) {
            return Err(TransportError::Io(std::io::Error::other("permission denied")));
        }

        self.aliases.lock().unwrap().push((name.to_string(), alias.to_string()));
        Ok(())
    }
}

pub struct MockApp {
    pub clock: Arc<FixedClock>,
    pub sensor: MockSensor,
    pub sink: Arc<RecordingChannelSink>,
    pub renderer: Arc<MockRenderer>,
    pub transport: Arc<MockTransport>,
    pub sampler: SamplerService,
}

impl MockApp {
    pub fn new() -> Self {
        Self::with_parts(
            RecordingChannelSink::default(),
            MockRenderer::default(),
            MockTransport::default(),
        )
    }

    pub fn with_parts(sink: RecordingChannelSink, renderer: MockRenderer, transport: MockTransport) -> Self {
        let clock = Arc::new(FixedClock::new(datetime!(2024-01-15 10:30 UTC)));
        let sensor = MockSensor::default();
        let sink = Arc::new(sink);
        let renderer = Arc::new(renderer);
        let transport = Arc::new(transport);
        let settings = sampler_settings();

        let telemetry = TelemetryPublisher::new(TelemetrySink::Channel(sink.clone()), settings.timeout());
        let artifacts = ArtifactPublisher::new(transport.clone(), settings.timeout());
        let sampler = SamplerService::new(
            Box::new(sensor.clone()),
            clock.clone(),
            telemetry,
            ChartBuilder::new(renderer.clone()),
            &settings,
        )
        .with_artifacts(artifacts);

        Self {
            clock,
            sensor,
            sink,
            renderer,
            transport,
            sampler,
        }
    }
}
