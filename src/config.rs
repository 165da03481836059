//! Runtime configuration for the recorder.
//!
//! Settings load from an optional TOML file merged with `TAPES_*`
//! environment variables (e.g. `TAPES_RECORDING__NUM_WORKERS=4`), with
//! serde defaults underneath and a validation pass before use.

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use crate::publisher::kafka::KafkaConfig;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TapesConfig {
    /// Recording pool settings.
    #[serde(default)]
    pub recording: RecordingConfig,

    /// Kafka event sink. Publishing is disabled when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kafka: Option<KafkaSettings>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Worker pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Worker task count. Must be at least 1.
    #[serde(default = "default_num_workers")]
    pub num_workers: usize,

    /// Bounded queue capacity. 0 selects `num_workers * 8`.
    #[serde(default)]
    pub queue_size: usize,
}

fn default_num_workers() -> usize {
    2
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            num_workers: default_num_workers(),
            queue_size: 0,
        }
    }
}

/// Kafka sink settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KafkaSettings {
    pub brokers: Vec<String>,
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default = "default_publish_timeout_ms")]
    pub publish_timeout_ms: u64,
}

fn default_publish_timeout_ms() -> u64 {
    5_000
}

impl KafkaSettings {
    /// Convert to the publisher's configuration type.
    pub fn to_kafka_config(&self) -> KafkaConfig {
        KafkaConfig {
            brokers: self.brokers.clone(),
            topic: self.topic.clone(),
            client_id: self.client_id.clone(),
            publish_timeout: Some(Duration::from_millis(self.publish_timeout_ms)),
        }
    }
}

impl TapesConfig {
    /// Load configuration from the given file (or `tapes.toml` in the
    /// working directory when `None`), apply `TAPES_*` environment
    /// overrides, and validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name("tapes").required(false)),
        };

        let settings = builder
            .add_source(Environment::with_prefix("TAPES").separator("__"))
            .build()?;

        let parsed: TapesConfig = settings.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Check invariants the types alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recording.num_workers == 0 {
            return Err(ConfigError::Invalid(
                "recording.num_workers must be at least 1".to_string(),
            ));
        }

        if let Some(kafka) = &self.kafka {
            if kafka.brokers.is_empty() {
                return Err(ConfigError::Invalid(
                    "kafka.brokers must not be empty".to_string(),
                ));
            }
            if kafka.topic.is_empty() {
                return Err(ConfigError::Invalid(
                    "kafka.topic must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}
