//! Server configuration.

use std::fs;
use std::path::Path;

use dags_protocol::PROTOCOL_VERSION;
use serde::{Deserialize, Serialize};

/// Server configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Version string stamped on every response.
    pub version: String,
    /// Client versions the server accepts.
    pub supported_versions: Vec<String>,
    /// Highest payload compression level accepted.
    pub max_compression_level: u32,
    /// First id handed out to a new client.
    pub first_client_id: i32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            supported_versions: vec![PROTOCOL_VERSION.to_string()],
            max_compression_level: 9,
            first_client_id: 1,
        }
    }
}

/// Errors loading server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ServerConfig {
    /// Load from a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.first_client_id < 0 {
            return Err(ConfigError::Invalid(format!(
                "first_client_id must be non-negative, got {}",
                self.first_client_id
            )));
        }
        if self.supported_versions.is_empty() {
            return Err(ConfigError::Invalid(
                "supported_versions must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn supports_version(&self, version: &str) -> bool {
        self.supported_versions.iter().any(|v| v == version)
    }
}
