//! Client configuration
//!
//! Layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. Host/user config (~/.config/dags/client.toml)
//! 3. Project config (.dags/client.toml or --config)
//! 4. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::{BuiltinDefaults, ClientSettings};
pub use effective::{ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig};
pub use merge::{deep_merge, merge_layers};
