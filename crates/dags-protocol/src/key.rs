//! Composite key for requests.

use crate::request::{Request, RequestType};

/// Identifies what a request is about: who asked, for what, and which group.
///
/// Built from the effective group id, so a universe request with a stale
/// stored group id keys the same as one without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey {
    pub client_id: Option<i32>,
    pub request_type: RequestType,
    pub group_id: Option<i32>,
}

impl RequestKey {
    pub fn of(request: &Request) -> Self {
        Self {
            client_id: request.assigned_client_id(),
            request_type: request.request_type(),
            group_id: request.effective_group_id(),
        }
    }
}
