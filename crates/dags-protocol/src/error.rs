//! Error code registry and local protocol errors.

use std::fmt;

/// Error codes carried in a request's `error` field.
///
/// These codes are stable and shared by clients and the dispatch server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Malformed JSON, unknown request type, or an invalid field combination.
    InvalidRequest,
    /// The request's version is not accepted by the server.
    UnsupportedVersion,
    /// The client id was never assigned by this server.
    UnknownClient,
    /// Compression level above what the server accepts.
    CompressionUnsupported,
    /// Group or job request without an application name.
    MissingAppName,
}

impl ErrorCode {
    /// Numeric value sent on the wire
    pub fn code(&self) -> i32 {
        match self {
            ErrorCode::InvalidRequest => 1,
            ErrorCode::UnsupportedVersion => 2,
            ErrorCode::UnknownClient => 3,
            ErrorCode::CompressionUnsupported => 4,
            ErrorCode::MissingAppName => 5,
        }
    }

    /// Look up a wire value. Unknown codes return `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(ErrorCode::InvalidRequest),
            2 => Some(ErrorCode::UnsupportedVersion),
            3 => Some(ErrorCode::UnknownClient),
            4 => Some(ErrorCode::CompressionUnsupported),
            5 => Some(ErrorCode::MissingAppName),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::UnknownClient => "UNKNOWN_CLIENT",
            ErrorCode::CompressionUnsupported => "COMPRESSION_UNSUPPORTED",
            ErrorCode::MissingAppName => "MISSING_APP_NAME",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised where a request crosses the wire boundary.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Unknown request type: {0:?}")]
    UnknownRequestType(String),

    #[error("Invalid request state: {0}")]
    InvalidRequestState(String),
}

impl ProtocolError {
    /// Error code reported to the peer for this failure
    pub fn code(&self) -> ErrorCode {
        ErrorCode::InvalidRequest
    }
}

impl From<serde_json::Error> for ProtocolError {
    fn from(e: serde_json::Error) -> Self {
        ProtocolError::InvalidJson(e.to_string())
    }
}
