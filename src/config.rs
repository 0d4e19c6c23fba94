//! Client Configuration
//!
//! Optional TOML file; every field has a default so the client runs without one.

use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {}", .0.display(), .1)]
    IoError(PathBuf, std::io::Error),

    #[error("TOML parse error: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `accept-version` header of the CONNECT frame
    pub accept_version: String,
    /// `host` header override; defaults to the host of the login address
    pub virtual_host: Option<String>,
    /// env_logger filter when `RUST_LOG` is not set
    pub log_level: String,
    /// Base directory for relative summary paths
    pub reports_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            accept_version: "1.2".to_string(),
            virtual_host: None,
            log_level: "info".to_string(),
            reports_dir: None,
        }
    }
}

impl ClientConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stomp-client").join("config.toml"))
    }

    /// Parse TOML content
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        debug!("Loaded config from {:?}", path);
        Self::parse(&content)
    }

    /// Load the explicit path, else the default location if present, else defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// `host` header for a login to `address_host`
    pub fn connect_host<'a>(&'a self, address_host: &'a str) -> &'a str {
        self.virtual_host.as_deref().unwrap_or(address_host)
    }
}
