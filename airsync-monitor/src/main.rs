use std::path::PathBuf;
use std::sync::Arc;

use airsync_monitor::configs::{Mqtt, Settings, Telemetry};
use airsync_monitor::errors::ConfigError;
use airsync_monitor::run;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

#[derive(Debug, Parser)]
#[command(name = "airsync")]
#[command(about = "Samples an air quality sensor, publishes telemetry and hourly charts")]
#[command(version)]
struct Cli {
    /// TOML settings file [default: configs/default.toml when present]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Post every reading as JSON to this URL
    #[arg(
        long,
        value_name = "URL",
        conflicts_with_all = [
            "mqtt_host",
            "mqtt_port",
            "mqtt_client_id",
            "mqtt_username",
            "mqtt_password",
            "mqtt_base_topic",
        ]
    )]
    webhook_url: Option<String>,

    /// Publish every channel to this MQTT broker
    #[arg(long, value_name = "HOST")]
    mqtt_host: Option<String>,

    #[arg(long, value_name = "PORT")]
    mqtt_port: Option<u16>,

    #[arg(long, value_name = "ID")]
    mqtt_client_id: Option<String>,

    #[arg(long, value_name = "USER")]
    mqtt_username: Option<String>,

    #[arg(long, value_name = "PASSWORD")]
    mqtt_password: Option<String>,

    /// Topic prefix for discovery and state messages
    #[arg(long, value_name = "TOPIC")]
    mqtt_base_topic: Option<String>,

    /// Seconds between samples
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,

    /// trace, debug, info, warn or error
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    fn mqtt_requested(&self) -> bool {
        self.mqtt_host.is_some()
            || self.mqtt_port.is_some()
            || self.mqtt_client_id.is_some()
            || self.mqtt_username.is_some()
            || self.mqtt_password.is_some()
            || self.mqtt_base_topic.is_some()
    }

    /// Layer command line flags over the loaded settings.
    fn apply(self, settings: &mut Settings) {
        if let Some(level) = &self.log_level {
            settings.logger.level = level.clone();
        }
        if let Some(interval) = self.interval {
            settings.sampler.interval_secs = interval;
        }

        if let Some(url) = self.webhook_url {
            settings.telemetry = Some(Telemetry::Webhook { url });
            return;
        }

        if !self.mqtt_requested() {
            return;
        }

        let mut mqtt = match settings.telemetry.take() {
            Some(Telemetry::Mqtt(mqtt)) => mqtt,
            _ => Mqtt {
                host: String::new(),
                port: Mqtt::default_port(),
                client_id: Mqtt::default_client_id(),
                base_topic: String::new(),
                username: None,
                password: None,
            },
        };

        if let Some(host) = self.mqtt_host {
            mqtt.host = host;
        }
        if let Some(port) = self.mqtt_port {
            mqtt.port = port;
        }
        if let Some(client_id) = self.mqtt_client_id {
            mqtt.client_id = client_id;
        }
        if let Some(base_topic) = self.mqtt_base_topic {
            mqtt.base_topic = base_topic;
        }
        if self.mqtt_username.is_some() {
            mqtt.username = self.mqtt_username;
        }
        if self.mqtt_password.is_some() {
            mqtt.password = self.mqtt_password;
        }

        settings.telemetry = Some(Telemetry::Mqtt(mqtt));
    }

    fn settings(self) -> Result<Settings, ConfigError> {
        let mut settings = Settings::load(self.config.as_deref())?;
        self.apply(&mut settings);
        settings.validate()?;

        Ok(settings)
    }
}

fn exit_with(error: ConfigError) -> ! {
    let kind = match error {
        ConfigError::MissingTelemetry => ErrorKind::MissingRequiredArgument,
        ConfigError::Read { .. } => ErrorKind::Io,
        ConfigError::Parse(_) | ConfigError::Invalid { .. } => ErrorKind::ValueValidation,
    };

    Cli::command().error(kind, error).exit()
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received Ctrl-C, stopping after the current sample"),
        Err(e) => {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[tokio::main]
async fn main() {
    let settings = match Cli::parse().settings() {
        Ok(settings) => Arc::new(settings),
        Err(e) => exit_with(e),
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let app_name = env!("CARGO_PKG_NAME").replace('-', "_");
            let level = settings.logger.level.as_str();

            format!("{app_name}={level},airsync_api={level}").into()
        }))
        .init();

    if let Err(e) = run(&settings, shutdown_signal()).await {
        exit_with(e);
    }
}
