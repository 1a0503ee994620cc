//! Request envelope.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// Sentinel for an identity that has not been assigned (client id, group id).
pub const UNSET_ID: i32 = -1;

/// Sentinel for "no error" in the `error` field.
pub const NO_ERROR: i32 = -1;

/// What a request addresses in the job hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequestType {
    /// No request type given (empty on the wire).
    #[default]
    Unspecified,
    /// Top-level scope of work.
    Universe,
    /// A collection of related jobs, identified by a group id.
    Group,
    /// Individual jobs within a group.
    Job,
}

impl RequestType {
    /// Returns the wire representation of the request type
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Unspecified => "",
            RequestType::Universe => "universe",
            RequestType::Group => "group",
            RequestType::Job => "job",
        }
    }

    /// Returns true if a group id is meaningful for this request type
    pub fn addresses_group(&self) -> bool {
        matches!(self, RequestType::Group | RequestType::Job)
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(RequestType::Unspecified),
            "universe" => Ok(RequestType::Universe),
            "group" => Ok(RequestType::Group),
            "job" => Ok(RequestType::Job),
            other => Err(ProtocolError::UnknownRequestType(other.to_string())),
        }
    }
}

/// One client/server exchange unit.
///
/// Setters are unconstrained: any combination of values is representable.
/// Consistency between fields is checked where a request crosses the wire
/// (see [`crate::wire::validate`]), never here.
///
/// There is deliberately no `PartialEq` or `Hash`; use [`crate::RequestKey`]
/// when a request has to key a map.
#[derive(Debug, Clone)]
pub struct Request {
    client_id: i32,
    error: i32,
    request_type: RequestType,
    app_name: String,
    group_id: i32,
    version: String,
    compression_level: u32,
    uncompressed_size: Option<u32>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            client_id: UNSET_ID,
            error: NO_ERROR,
            request_type: RequestType::Unspecified,
            app_name: String::new(),
            group_id: UNSET_ID,
            version: String::new(),
            compression_level: 0,
            uncompressed_size: None,
        }
    }
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// Server-assigned client id, or [`UNSET_ID`].
    pub fn client_id(&self) -> i32 {
        self.client_id
    }

    pub fn set_client_id(&mut self, client_id: i32) {
        self.client_id = client_id;
    }

    /// Error code raised by either peer, or [`NO_ERROR`].
    pub fn error(&self) -> i32 {
        self.error
    }

    pub fn set_error(&mut self, error: i32) {
        self.error = error;
    }

    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    pub fn set_request_type(&mut self, request_type: RequestType) {
        self.request_type = request_type;
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn set_app_name(&mut self, app_name: impl Into<String>) {
        self.app_name = app_name.into();
    }

    /// Stored group id. Only meaningful for group and job requests; prefer
    /// [`Request::effective_group_id`] when interpreting a request.
    pub fn group_id(&self) -> i32 {
        self.group_id
    }

    pub fn set_group_id(&mut self, group_id: i32) {
        self.group_id = group_id;
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// Compression level of the out-of-band payload; 0 means uncompressed.
    pub fn compression_level(&self) -> u32 {
        self.compression_level
    }

    pub fn set_compression_level(&mut self, level: u32) {
        self.compression_level = level;
    }

    /// Stored payload size before compression, if one was ever set.
    pub fn uncompressed_size(&self) -> Option<u32> {
        self.uncompressed_size
    }

    pub fn set_uncompressed_size(&mut self, size: u32) {
        self.uncompressed_size = Some(size);
    }

    pub fn clear_uncompressed_size(&mut self) {
        self.uncompressed_size = None;
    }

    /// The client id, if the server has assigned one.
    pub fn assigned_client_id(&self) -> Option<i32> {
        (self.client_id != UNSET_ID).then_some(self.client_id)
    }

    /// The error code, or `None` on success.
    pub fn error_code(&self) -> Option<i32> {
        (self.error != NO_ERROR).then_some(self.error)
    }

    pub fn is_success(&self) -> bool {
        self.error == NO_ERROR
    }

    /// Group id as collaborators must observe it: unset unless the request
    /// addresses a group or job.
    pub fn effective_group_id(&self) -> Option<i32> {
        if self.request_type.addresses_group() && self.group_id != UNSET_ID {
            Some(self.group_id)
        } else {
            None
        }
    }

    /// Uncompressed payload size, readable only while compression is active.
    pub fn payload_size(&self) -> Option<u32> {
        if self.compression_level > 0 {
            self.uncompressed_size
        } else {
            None
        }
    }
}
