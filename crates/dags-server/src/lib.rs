//! DAGS Dispatch Server
//!
//! Reads request envelopes line by line, assigns client identities, and
//! answers each request with a response envelope whose `error` field reports
//! the outcome.
//!
//! This crate can be used in two modes:
//! - **Standalone binary**: `dags-server rpc` over stdin/stdout
//! - **In-process library**: for tests that drive the handler directly

pub mod config;
pub mod dispatcher;
pub mod rpc;

pub use config::{ConfigError, ServerConfig};
pub use dispatcher::{DispatchError, Dispatcher};
pub use rpc::RpcHandler;
