//! Configuration management for Tollgate.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, TollgateError};
use crate::gate::TimeWindow;

/// Default document registry endpoint.
pub const DEFAULT_API_URL: &str = "https://ismp.crpt.ru/api/v3/lk/documents/create";

/// Prefix for environment variable overrides, e.g. `TOLLGATE__GATE__CAPACITY`.
const ENV_PREFIX: &str = "TOLLGATE";

/// Main configuration for Tollgate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TollgateConfig {
    /// Admission gate configuration
    #[serde(default)]
    pub gate: GateConfig,

    /// Registry API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// Admission gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Window length
    #[serde(default)]
    pub window: TimeWindow,

    /// Submissions allowed per window
    #[serde(default = "default_capacity")]
    pub capacity: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            window: TimeWindow::default(),
            capacity: default_capacity(),
        }
    }
}

fn default_capacity() -> u64 {
    10
}

impl GateConfig {
    /// Reject windows or capacities the gate cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(TollgateError::Config(
                "gate.capacity must be greater than 0".to_string(),
            ));
        }
        if self.window.magnitude == 0 {
            return Err(TollgateError::Config(
                "gate.window.magnitude must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Registry API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Document creation endpoint
    #[serde(default = "default_api_url")]
    pub url: String,

    /// TCP connect timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Whole-request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_connect_timeout() -> u64 {
    2000
}

fn default_request_timeout() -> u64 {
    10000
}

impl ApiConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl TollgateConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: TollgateConfig = serde_yaml::from_str(yaml)
            .map_err(|e| TollgateError::Config(e.to_string()))?;
        config.gate.validate()?;
        Ok(config)
    }

    /// Load configuration from an optional file, overridden by `TOLLGATE__*`
    /// environment variables.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }
        let config: TollgateConfig = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.gate.validate()?;
        Ok(config)
    }
}
