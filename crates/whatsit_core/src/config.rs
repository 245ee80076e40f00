//! Client configuration: where classification requests go.

use crate::error::ConfigError;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_ENDPOINT_URL: &str = "https://stormy-sands-03353.herokuapp.com/";

/// Environment variable that overrides the endpoint from the config file.
pub const ENDPOINT_ENV_VAR: &str = "WHATSIT_ENDPOINT_URL";

pub const CONFIG_FILE_NAME: &str = "whatsit.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    #[serde(alias = "endpointURL")]
    pub endpoint_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(endpoint_url: impl Into<String>) -> Result<Self, ConfigError> {
        let cfg = Self {
            endpoint_url: endpoint_url.into().trim().to_string(),
        };
        cfg.endpoint()?;
        Ok(cfg)
    }

    /// Parsed endpoint. Only absolute http(s) URLs are usable.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidEndpoint {
            url: self.endpoint_url.clone(),
            reason,
        };
        let url = Url::parse(&self.endpoint_url).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(invalid(format!("unsupported scheme {other:?}"))),
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }
        Ok(url)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: ClientConfig = toml::from_str(raw)?;
        cfg.endpoint()?;
        Ok(cfg)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reads the config file; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        tracing::info!("saved config to {}", path.display());
        Ok(())
    }

    /// Applies the value of [`ENDPOINT_ENV_VAR`] when one was set.
    pub fn with_env_override(self, value: Option<String>) -> Result<Self, ConfigError> {
        match value {
            Some(url) if !url.trim().is_empty() => {
                tracing::info!("endpoint overridden by {ENDPOINT_ENV_VAR}");
                Self::new(url)
            }
            _ => Ok(self),
        }
    }
}
