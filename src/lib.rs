//! DAGS client
//!
//! Client side of the request envelope exchanged with the DAGS dispatch
//! server: layered configuration, sessions that track the server-assigned
//! client id, and the `dags` command-line tool.

pub mod commands;
pub mod config;
pub mod session;

pub use config::{ClientSettings, ConfigError, EffectiveConfig};
pub use dags_protocol::{wire, ErrorCode, ProtocolError, Request, RequestKey, RequestType};
pub use session::{Session, SessionError};
