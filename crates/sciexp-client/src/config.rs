use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::context::GatewayContext;

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

const ENV_SERVER_HOST: &str = "SCIEXP_SERVER_HOST";
const ENV_SERVER_PORT: &str = "SCIEXP_SERVER_PORT";
const ENV_TIMEOUT_MS: &str = "SCIEXP_TIMEOUT_MS";
const ENV_GATEWAY_ID: &str = "SCIEXP_GATEWAY_ID";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid value for {key}: '{value}'")]
    InvalidOverride { key: String, value: String },
    #[error("invalid config:\n{0}")]
    Invalid(String),
}

/// Connection parameters read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub server_host: String,
    pub server_port: u16,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    pub gateway_id: String,
    #[serde(default)]
    pub application_interface_id: Option<String>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl ClientConfig {
    /// Reads the YAML file, applies `SCIEXP_*` environment overrides, validates.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&raw)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_SERVER_HOST) {
            self.server_host = host;
        }
        if let Some(raw) = lookup(ENV_SERVER_PORT) {
            self.server_port = parse_override(ENV_SERVER_PORT, &raw)?;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            self.timeout_ms = parse_override(ENV_TIMEOUT_MS, &raw)?;
        }
        if let Some(gateway) = lookup(ENV_GATEWAY_ID) {
            self.gateway_id = gateway;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        if self.server_host.trim().is_empty() {
            problems.push("server_host must not be empty");
        }
        if self.server_port == 0 {
            problems.push("server_port must be non-zero");
        }
        if self.timeout_ms == 0 {
            problems.push("timeout_ms must be positive");
        }
        if self.gateway_id.trim().is_empty() {
            problems.push("gateway_id must not be empty");
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(
                problems
                    .iter()
                    .map(|p| format!("  - {}", p))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ))
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn gateway_context(&self) -> GatewayContext {
        GatewayContext {
            gateway_id: self.gateway_id.clone(),
            application_interface_id: self.application_interface_id.clone(),
        }
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride {
            key: key.to_string(),
            value: raw.to_string(),
        })
}
