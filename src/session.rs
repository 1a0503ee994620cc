//! Client session
//!
//! Builds outgoing requests from the client settings and keeps the client id
//! the server hands out. Once assigned, the id never changes for the life of
//! the session; a response carrying a different id is an error.

use dags_protocol::{ErrorCode, Request, RequestType};
use tracing::debug;

use crate::config::ClientSettings;

/// Errors interpreting a server response.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Server reported error {}{}", .code, name_suffix(.code))]
    Remote { code: i32 },

    #[error("Response carries no client id")]
    MissingClientId,

    #[error("Client id changed from {assigned} to {received}")]
    ClientIdChanged { assigned: i32, received: i32 },
}

impl SessionError {
    /// Registry entry for a remote error, if the code is known
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            SessionError::Remote { code } => ErrorCode::from_code(*code),
            _ => None,
        }
    }
}

fn name_suffix(code: &i32) -> String {
    ErrorCode::from_code(*code)
        .map(|c| format!(" ({})", c))
        .unwrap_or_default()
}

/// One client's view of its exchanges with the dispatch server.
#[derive(Debug)]
pub struct Session {
    settings: ClientSettings,
    client_id: Option<i32>,
}

impl Session {
    pub fn new(settings: ClientSettings) -> Self {
        Self {
            settings,
            client_id: None,
        }
    }

    /// Resume a session whose id was assigned earlier.
    pub fn with_client_id(settings: ClientSettings, client_id: i32) -> Self {
        Self {
            settings,
            client_id: Some(client_id),
        }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn client_id(&self) -> Option<i32> {
        self.client_id
    }

    /// Build a request with no payload attached.
    ///
    /// `group_id` is only stored for group and job requests.
    pub fn request(&self, kind: RequestType, group_id: Option<i32>) -> Request {
        let mut request = Request::new();
        if let Some(id) = self.client_id {
            request.set_client_id(id);
        }
        request.set_request_type(kind);
        request.set_app_name(self.settings.app_name.as_str());
        request.set_version(self.settings.version.as_str());
        if let Some(group_id) = group_id.filter(|_| kind.addresses_group()) {
            request.set_group_id(group_id);
        }
        request
    }

    /// Build a request announcing an out-of-band payload of
    /// `uncompressed_size` bytes, compressed at the configured level.
    pub fn payload_request(
        &self,
        kind: RequestType,
        group_id: Option<i32>,
        uncompressed_size: u32,
    ) -> Request {
        let mut request = self.request(kind, group_id);
        let level = self.settings.compression_level;
        request.set_compression_level(level);
        if level > 0 {
            request.set_uncompressed_size(uncompressed_size);
        }
        request
    }

    /// Record the outcome of a response.
    pub fn accept(&mut self, response: &Request) -> Result<(), SessionError> {
        if let Some(code) = response.error_code() {
            return Err(SessionError::Remote { code });
        }

        let received = response
            .assigned_client_id()
            .ok_or(SessionError::MissingClientId)?;

        match self.client_id {
            Some(assigned) if assigned != received => {
                Err(SessionError::ClientIdChanged { assigned, received })
            }
            Some(_) => {
                debug!(client_id = received, "response accepted");
                Ok(())
            }
            None => {
                debug!(client_id = received, "client id assigned");
                self.client_id = Some(received);
                Ok(())
            }
        }
    }
}
