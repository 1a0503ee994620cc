//! Built-in client defaults (layer 1)

use dags_protocol::PROTOCOL_VERSION;
use serde::{Deserialize, Serialize};

/// Settings a client session is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Application name stamped on every request
    pub app_name: String,

    /// Client version string
    pub version: String,

    /// Compression level for out-of-band payloads (0 = uncompressed)
    pub compression_level: u32,
}

/// Built-in default configuration values
#[derive(Debug, Clone)]
pub struct BuiltinDefaults {
    pub settings: ClientSettings,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            settings: ClientSettings {
                app_name: String::new(),
                version: PROTOCOL_VERSION.to_string(),
                compression_level: 0,
            },
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "app_name": self.settings.app_name,
            "version": self.settings.version,
            "compression_level": self.settings.compression_level,
        })
    }
}
