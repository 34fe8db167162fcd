use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LoggingConfig;

/// Environment variables with this prefix override file values,
/// e.g. `NODESTATUS_LOGGING__LEVEL=debug`.
pub const ENV_PREFIX: &str = "NODESTATUS_";

/// Largest accepted poll interval, in seconds.
pub const MAX_POLL_INTERVAL: u64 = u32::MAX as u64;

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    /// Address the `/metrics` endpoint listens on.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Seconds between two polls of the node status endpoint.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ConfigV1 {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            poll_interval: default_poll_interval(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ConfigV1 {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_POLL_INTERVAL).contains(&self.poll_interval) {
            return Err(ConfigError::Invalid(format!(
                "poll_interval must be between 1 and {} seconds",
                MAX_POLL_INTERVAL
            )));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_poll_interval() -> u64 {
    5
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error loading configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Layers built-in defaults, the YAML file at `path` (if present) and
/// `NODESTATUS_*` environment variables.
pub fn load_config(path: impl AsRef<Path>) -> Result<ConfigV1, ConfigError> {
    extract(
        Figment::from(Serialized::defaults(Config::ConfigV1(ConfigV1::default())))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__")),
    )
}

fn extract(figment: Figment) -> Result<ConfigV1, ConfigError> {
    let config = figment.extract::<Config>().map_err(Box::new)?;
    let config = match config {
        Config::ConfigV1(c) => c,
    };
    config.validate()?;
    Ok(config)
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    match serde_json::to_string_pretty(&schema) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error rendering configuration schema: {}", e),
    }
}
