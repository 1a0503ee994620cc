//! DAGS Protocol Types
//!
//! Defines the request envelope exchanged between a client and the dispatch
//! server, the numeric error codes it carries, and the single-line JSON codec
//! used on the wire.

pub mod error;
pub mod key;
pub mod request;
pub mod wire;

pub use error::{ErrorCode, ProtocolError};
pub use key::RequestKey;
pub use request::{Request, RequestType, NO_ERROR, UNSET_ID};

/// Protocol version spoken by this implementation.
pub const PROTOCOL_VERSION: &str = "1.0";
