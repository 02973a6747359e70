use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::services::{MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH};

pub const DEFAULT_CONFIG_PATH: &str = "configs/default.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logger {
    pub level: String,
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            level: String::from("info"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Sampler {
    /// Seconds between two ticks
    pub interval_secs: u64,
    /// Seconds to wait after starting measurement before the first tick
    pub warmup_secs: u64,
    /// Upper bound in seconds for any single external call
    pub timeout_secs: u64,
}

impl Sampler {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn warmup(&self) -> Duration {
        Duration::from_secs(self.warmup_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            warmup_secs: 1,
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mqtt {
    pub host: String,
    #[serde(default = "Mqtt::default_port")]
    pub port: u16,
    #[serde(default = "Mqtt::default_client_id")]
    pub client_id: String,
    pub base_topic: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Mqtt {
    pub fn default_port() -> u16 {
        1883
    }

    pub fn default_client_id() -> String {
        String::from("airsync")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Telemetry {
    Webhook { url: String },
    Mqtt(Mqtt),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ArtifactTarget {
    Ssh { host: String, directory: String },
    Local { directory: String },
}

impl Default for ArtifactTarget {
    fn default() -> Self {
        ArtifactTarget::Ssh {
            host: String::from("arm3"),
            directory: String::from("/var/www/html/airquality"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Artifacts {
    pub enabled: bool,
    pub target: ArtifactTarget,
}

impl Default for Artifacts {
    fn default() -> Self {
        Self {
            enabled: true,
            target: ArtifactTarget::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Chart {
    pub width: u32,
    pub height: u32,
}

impl Default for Chart {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logger: Logger,
    pub sampler: Sampler,
    pub telemetry: Option<Telemetry>,
    pub artifacts: Artifacts,
    pub chart: Chart,
}

impl Settings {
    /// Load settings from `path`, or from [`DEFAULT_CONFIG_PATH`] when it
    /// exists, or fall back to built-in defaults.
    ///
    /// The result is not validated yet: command line overrides are applied
    /// on top of it first.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None if Path::new(DEFAULT_CONFIG_PATH).is_file() => PathBuf::from(DEFAULT_CONFIG_PATH),
            None => return Ok(Self::default()),
        };

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut settings: Settings = toml::from_str(content)?;

        if let ArtifactTarget::Local { directory } = &mut settings.artifacts.target {
            *directory = normalize_path(directory)
                .map_err(|e| ConfigError::Invalid {
                    field: "artifacts.target.directory",
                    reason: e.to_string(),
                })?
                .to_string_lossy()
                .to_string();
        }

        Ok(settings)
    }

    /// Check the settings the pipeline can not start without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.telemetry {
            None => return Err(ConfigError::MissingTelemetry),
            Some(Telemetry::Webhook { url }) if url.trim().is_empty() => {
                return Err(ConfigError::MissingTelemetry);
            }
            Some(Telemetry::Webhook { url }) => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::Invalid {
                        field: "telemetry.url",
                        reason: format!("`{url}` is not an http(s) URL"),
                    });
                }
            }
            Some(Telemetry::Mqtt(mqtt)) => {
                if mqtt.host.trim().is_empty() || mqtt.base_topic.trim().is_empty() {
                    return Err(ConfigError::MissingTelemetry);
                }
                if mqtt.password.is_some() && mqtt.username.is_none() {
                    return Err(ConfigError::Invalid {
                        field: "telemetry.password",
                        reason: String::from("a password requires a username"),
                    });
                }
            }
        }

        if self.sampler.interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "sampler.interval_secs",
                reason: String::from("must be at least one second"),
            });
        }

        if self.sampler.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "sampler.timeout_secs",
                reason: String::from("must be at least one second"),
            });
        }

        if !(MIN_WIDTH..=MAX_WIDTH).contains(&self.chart.width) {
            return Err(ConfigError::Invalid {
                field: "chart.width",
                reason: format!("must be between {MIN_WIDTH} and {MAX_WIDTH} pixels"),
            });
        }

        if !(MIN_HEIGHT..=MAX_HEIGHT).contains(&self.chart.height) {
            return Err(ConfigError::Invalid {
                field: "chart.height",
                reason: format!("must be between {MIN_HEIGHT} and {MAX_HEIGHT} pixels"),
            });
        }

        Ok(())
    }
}

/// Resolve a relative path against the working directory.
pub fn normalize_path(path: &str) -> io::Result<PathBuf> {
    let path_buf = PathBuf::from(path);

    Ok(if path_buf.is_absolute() {
        path_buf
    } else {
        env::current_dir()?.join(path_buf)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_arm3_deployment() {
        let settings = Settings::default();

        assert_eq!(settings.sampler.interval(), Duration::from_secs(60));
        assert_eq!(settings.sampler.warmup(), Duration::from_secs(1));
        assert!(settings.artifacts.enabled);
        match settings.artifacts.target {
            ArtifactTarget::Ssh { host, directory } => {
                assert_eq!(host, "arm3");
                assert_eq!(directory, "/var/www/html/airquality");
            }
            other => panic!("unexpected target {other:?}"),
        }
    }

    #[test]
    fn test_parse_webhook() {
        let settings = Settings::parse(
            r#"
            [logger]
            level = "debug"

            [telemetry]
            type = "webhook"
            url = "http://homeassistant.local:8123/api/webhook/airquality"
            "#,
        )
        .unwrap();

        assert_eq!(settings.logger.level, "debug");
        assert!(matches!(settings.telemetry, Some(Telemetry::Webhook { .. })));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_parse_mqtt_with_defaults() {
        let settings = Settings::parse(
            r#"
            [sampler]
            interval_secs = 30

            [telemetry]
            type = "mqtt"
            host = "broker.local"
            base_topic = "homeassistant/sensor/airquality"
            username = "sensor"
            password = "secret"

            [artifacts]
            enabled = false
            "#,
        )
        .unwrap();

        let Some(Telemetry::Mqtt(mqtt)) = &settings.telemetry else {
            panic!("expected mqtt telemetry");
        };
        assert_eq!(mqtt.port, 1883);
        assert_eq!(mqtt.client_id, "airsync");
        assert_eq!(settings.sampler.interval_secs, 30);
        assert_eq!(settings.sampler.timeout_secs, 20);
        assert!(!settings.artifacts.enabled);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_local_directory_is_normalized() {
        let settings = Settings::parse(
            r#"
            [artifacts.target]
            type = "local"
            directory = "charts"
            "#,
        )
        .unwrap();

        let ArtifactTarget::Local { directory } = settings.artifacts.target else {
            panic!("expected local target");
        };
        assert!(Path::new(&directory).is_absolute());
        assert!(directory.ends_with("charts"));
    }

    #[test]
    fn test_missing_telemetry_is_rejected() {
        let settings = Settings::default();
        assert!(matches!(settings.validate(), Err(ConfigError::MissingTelemetry)));

        let settings = Settings {
            telemetry: Some(Telemetry::Webhook { url: String::new() }),
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(ConfigError::MissingTelemetry)));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut settings = Settings {
            telemetry: Some(Telemetry::Webhook {
                url: String::from("ftp://example.com"),
            }),
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid { field: "telemetry.url", .. })));

        settings.telemetry = Some(Telemetry::Webhook {
            url: String::from("http://example.com/hook"),
        });
        settings.sampler.interval_secs = 0;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Invalid { field: "sampler.interval_secs", .. })
        ));
    }

    #[test]
    fn test_chart_size_is_bounded() {
        let valid = Settings {
            telemetry: Some(Telemetry::Webhook {
                url: String::from("http://example.com/hook"),
            }),
            ..Settings::default()
        };
        assert!(valid.validate().is_ok());

        let mut settings = valid.clone();
        settings.chart.width = 100;
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid { field: "chart.width", .. })));

        let mut settings = valid.clone();
        settings.chart.height = 100_000;
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid { field: "chart.height", .. })));

        let mut settings = valid;
        settings.chart.width = u32::MAX;
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid { field: "chart.width", .. })));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let result = Settings::load(Some(Path::new("/nonexistent/airsync.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
