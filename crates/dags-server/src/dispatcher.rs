//! Request dispatcher.
//!
//! Checks each incoming request, hands out client ids, and builds the
//! response envelope. Failures never escape as Rust errors: they are turned
//! into a response whose `error` field carries the registry code.

use std::collections::HashSet;

use dags_protocol::{wire, ErrorCode, ProtocolError, Request, RequestType, UNSET_ID};
use tracing::{debug, warn};

use crate::config::ServerConfig;

/// Reasons a request is refused.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("Unsupported version {version:?}; supported: {supported:?}")]
    UnsupportedVersion { version: String, supported: Vec<String> },

    #[error("Unknown client id {0}")]
    UnknownClient(i32),

    #[error("Compression level {level} exceeds maximum {max}")]
    CompressionUnsupported { level: u32, max: u32 },

    #[error("{0} request without an application name")]
    MissingAppName(RequestType),

    #[error("No client ids left to assign")]
    ClientIdsExhausted,
}

impl DispatchError {
    /// Returns the registry code reported to the client
    pub fn code(&self) -> ErrorCode {
        match self {
            DispatchError::Protocol(e) => e.code(),
            DispatchError::UnsupportedVersion { .. } => ErrorCode::UnsupportedVersion,
            DispatchError::UnknownClient(_) => ErrorCode::UnknownClient,
            DispatchError::CompressionUnsupported { .. } => ErrorCode::CompressionUnsupported,
            DispatchError::MissingAppName(_) => ErrorCode::MissingAppName,
            DispatchError::ClientIdsExhausted => ErrorCode::UnknownClient,
        }
    }
}

/// Owns the client-id registry for one server process.
pub struct Dispatcher {
    config: ServerConfig,
    next_client_id: Option<i32>,
    clients: HashSet<i32>,
}

impl Dispatcher {
    pub fn new(config: ServerConfig) -> Self {
        let next_client_id = Some(config.first_client_id);
        Self {
            config,
            next_client_id,
            clients: HashSet::new(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Number of clients assigned an id so far.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn is_known_client(&self, client_id: i32) -> bool {
        self.clients.contains(&client_id)
    }

    /// Handle one raw input line. Bytes that are not UTF-8 get an
    /// `INVALID_REQUEST` response like any other undecodable line.
    pub fn handle_bytes(&mut self, bytes: &[u8]) -> String {
        match std::str::from_utf8(bytes) {
            Ok(line) => self.handle_line(line),
            Err(e) => {
                warn!(error = %e, "rejecting request that is not UTF-8");
                encode_response(&self.bare_error(ErrorCode::InvalidRequest))
            }
        }
    }

    /// Decode one request line, handle it, and encode the response line.
    pub fn handle_line(&mut self, line: &str) -> String {
        let response = match wire::decode(line) {
            Ok(request) => self.handle(&request),
            Err(e) => {
                warn!(error = %e, "rejecting undecodable request");
                self.bare_error(e.code())
            }
        };
        encode_response(&response)
    }

    /// Answer a request.
    pub fn handle(&mut self, request: &Request) -> Request {
        match self.admit(request) {
            Ok(client_id) => {
                debug!(client_id, request_type = %request.request_type(), "request accepted");
                self.reply(request, client_id, None)
            }
            Err(DispatchError::Protocol(e)) => {
                warn!(error = %e, "rejecting invalid request");
                self.bare_error(e.code())
            }
            Err(e) => {
                warn!(error = %e, code = e.code().code(), "rejecting request");
                let client_id = request
                    .assigned_client_id()
                    .filter(|id| self.is_known_client(*id))
                    .unwrap_or(UNSET_ID);
                self.reply(request, client_id, Some(e.code()))
            }
        }
    }

    /// Run every check and return the client id for the response, assigning
    /// a fresh one to new clients. Ids are only consumed by accepted requests.
    fn admit(&mut self, request: &Request) -> Result<i32, DispatchError> {
        wire::validate(request)?;

        if !self.config.supports_version(request.version()) {
            return Err(DispatchError::UnsupportedVersion {
                version: request.version().to_string(),
                supported: self.config.supported_versions.clone(),
            });
        }

        if request.compression_level() > self.config.max_compression_level {
            return Err(DispatchError::CompressionUnsupported {
                level: request.compression_level(),
                max: self.config.max_compression_level,
            });
        }

        if request.request_type().addresses_group() && request.app_name().is_empty() {
            return Err(DispatchError::MissingAppName(request.request_type()));
        }

        match request.assigned_client_id() {
            Some(id) if self.is_known_client(id) => Ok(id),
            Some(id) => Err(DispatchError::UnknownClient(id)),
            None => self.assign_client_id(),
        }
    }

    fn assign_client_id(&mut self) -> Result<i32, DispatchError> {
        let id = self.next_client_id.ok_or(DispatchError::ClientIdsExhausted)?;
        self.next_client_id = id.checked_add(1);
        self.clients.insert(id);
        debug!(client_id = id, "assigned client id");
        Ok(id)
    }

    fn reply(&self, request: &Request, client_id: i32, error: Option<ErrorCode>) -> Request {
        let mut response = Request::new();
        response.set_client_id(client_id);
        if let Some(code) = error {
            response.set_error(code.code());
        }
        response.set_request_type(request.request_type());
        response.set_app_name(request.app_name());
        if let Some(group_id) = request.effective_group_id() {
            response.set_group_id(group_id);
        }
        response.set_version(self.config.version.as_str());
        response
    }

    fn bare_error(&self, code: ErrorCode) -> Request {
        let mut response = Request::new();
        response.set_error(code.code());
        response.set_version(self.config.version.as_str());
        response
    }
}

fn encode_response(response: &Request) -> String {
    match wire::encode(response) {
        Ok(line) => line,
        Err(e) => {
            warn!(error = %e, "response failed to encode");
            serde_json::json!({ "error": ErrorCode::InvalidRequest.code() }).to_string()
        }
    }
}
