//! Wire codec
//!
//! One request per line, as a JSON object with camelCase keys:
//!
//! ```text
//! {"clientId":7,"error":-1,"requestType":"job","appName":"sim","groupId":42,"version":"1.2","compressionLevel":3,"uncompressedSize":10240}
//! ```
//!
//! Missing keys decode to the request defaults and unknown keys are ignored.
//! `uncompressedSize` is only written, and only read, when
//! `compressionLevel > 0`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProtocolError;
use crate::request::{Request, RequestType, NO_ERROR, UNSET_ID};

/// Serialized form of a [`Request`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireRequest {
    pub client_id: i32,
    pub error: i32,
    pub request_type: String,
    pub app_name: String,
    pub group_id: i32,
    pub version: String,
    pub compression_level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncompressed_size: Option<u32>,
}

impl Default for WireRequest {
    fn default() -> Self {
        Self {
            client_id: UNSET_ID,
            error: NO_ERROR,
            request_type: String::new(),
            app_name: String::new(),
            group_id: UNSET_ID,
            version: String::new(),
            compression_level: 0,
            uncompressed_size: None,
        }
    }
}

impl From<&Request> for WireRequest {
    fn from(request: &Request) -> Self {
        Self {
            client_id: request.client_id(),
            error: request.error(),
            request_type: request.request_type().as_str().to_string(),
            app_name: request.app_name().to_string(),
            group_id: request.effective_group_id().unwrap_or(UNSET_ID),
            version: request.version().to_string(),
            compression_level: request.compression_level(),
            uncompressed_size: request.payload_size(),
        }
    }
}

impl TryFrom<WireRequest> for Request {
    type Error = ProtocolError;

    fn try_from(wire: WireRequest) -> Result<Self, Self::Error> {
        let request_type: RequestType = wire.request_type.parse()?;

        let mut request = Request::new();
        request.set_client_id(wire.client_id);
        request.set_error(wire.error);
        request.set_request_type(request_type);
        request.set_app_name(wire.app_name);
        request.set_version(wire.version);
        request.set_compression_level(wire.compression_level);

        if request_type.addresses_group() {
            request.set_group_id(wire.group_id);
        } else if wire.group_id != UNSET_ID {
            debug!(group_id = wire.group_id, %request_type, "dropping group id on non-group request");
        }

        match wire.uncompressed_size {
            Some(size) if wire.compression_level > 0 => request.set_uncompressed_size(size),
            Some(size) => debug!(size, "dropping uncompressedSize on uncompressed request"),
            None => {}
        }

        validate(&request)?;
        Ok(request)
    }
}

/// Check the cross-field rules a request must satisfy to cross the wire.
pub fn validate(request: &Request) -> Result<(), ProtocolError> {
    if request.client_id() < UNSET_ID {
        return Err(ProtocolError::InvalidRequestState(format!(
            "clientId {} is negative",
            request.client_id()
        )));
    }
    if request.error() < NO_ERROR {
        return Err(ProtocolError::InvalidRequestState(format!(
            "error {} is negative",
            request.error()
        )));
    }
    if request.group_id() < UNSET_ID {
        return Err(ProtocolError::InvalidRequestState(format!(
            "groupId {} is negative",
            request.group_id()
        )));
    }
    if request.request_type().addresses_group() && request.group_id() == UNSET_ID {
        return Err(ProtocolError::InvalidRequestState(format!(
            "{} request without groupId",
            request.request_type()
        )));
    }
    if request.compression_level() > 0 && request.uncompressed_size().is_none() {
        return Err(ProtocolError::InvalidRequestState(format!(
            "compressionLevel {} without uncompressedSize",
            request.compression_level()
        )));
    }
    Ok(())
}

/// Encode a request as a single JSON line (without the trailing newline).
pub fn encode(request: &Request) -> Result<String, ProtocolError> {
    validate(request)?;
    Ok(serde_json::to_string(&WireRequest::from(request))?)
}

/// Decode one JSON line into a validated request.
pub fn decode(line: &str) -> Result<Request, ProtocolError> {
    let wire: WireRequest = serde_json::from_str(line.trim())?;
    Request::try_from(wire)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job_request() -> Request {
        let mut req = Request::new();
        req.set_client_id(7);
        req.set_request_type(RequestType::Job);
        req.set_app_name("sim");
        req.set_group_id(42);
        req.set_version("1.2");
        req.set_compression_level(3);
        req.set_uncompressed_size(10240);
        req
    }

    #[test]
    fn test_encode_compressed_job() {
        let line = encode(&job_request()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(
            value,
            json!({
                "clientId": 7,
                "error": -1,
                "requestType": "job",
                "appName": "sim",
                "groupId": 42,
                "version": "1.2",
                "compressionLevel": 3,
                "uncompressedSize": 10240
            })
        );
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_encode_omits_size_when_uncompressed() {
        let mut req = job_request();
        req.set_compression_level(0);
        let line = encode(&req).unwrap();
        assert!(!line.contains("uncompressedSize"));
    }

    #[test]
    fn test_encode_universe_writes_unset_group() {
        let mut req = Request::new();
        req.set_request_type(RequestType::Universe);
        req.set_group_id(9);
        let value: serde_json::Value = serde_json::from_str(&encode(&req).unwrap()).unwrap();
        assert_eq!(value["groupId"], -1);
        assert_eq!(value["requestType"], "universe");
    }

    #[test]
    fn test_decode_empty_object_gives_defaults() {
        let req = decode("{}").unwrap();
        assert_eq!(req.client_id(), -1);
        assert_eq!(req.error(), -1);
        assert_eq!(req.group_id(), -1);
        assert_eq!(req.request_type(), RequestType::Unspecified);
        assert_eq!(req.compression_level(), 0);
        assert!(req.app_name().is_empty());
        assert!(req.version().is_empty());
        assert!(req.uncompressed_size().is_none());
    }

    #[test]
    fn test_decode_ignores_unknown_keys() {
        let req = decode(r#"{"requestType":"universe","extra":true}"#).unwrap();
        assert_eq!(req.request_type(), RequestType::Universe);
    }

    #[test]
    fn test_decode_drops_size_when_uncompressed() {
        let req = decode(r#"{"compressionLevel":0,"uncompressedSize":99}"#).unwrap();
        assert!(req.uncompressed_size().is_none());
    }

    #[test]
    fn test_decode_clears_group_on_universe() {
        let req = decode(r#"{"requestType":"universe","groupId":5}"#).unwrap();
        assert_eq!(req.group_id(), -1);
    }

    #[test]
    fn test_decode_round_trips_job() {
        let original = job_request();
        let decoded = decode(&encode(&original).unwrap()).unwrap();
        assert_eq!(decoded.client_id(), 7);
        assert_eq!(decoded.request_type(), RequestType::Job);
        assert_eq!(decoded.group_id(), 42);
        assert_eq!(decoded.uncompressed_size(), Some(10240));
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let err = decode(r#"{"requestType":"cluster"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownRequestType(ref t) if t == "cluster"));
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        assert!(matches!(decode("{not json"), Err(ProtocolError::InvalidJson(_))));
        assert!(matches!(
            decode(r#"{"clientId":"7"}"#),
            Err(ProtocolError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_group_request_needs_group_id() {
        let mut req = Request::new();
        req.set_request_type(RequestType::Group);
        assert!(matches!(
            encode(&req),
            Err(ProtocolError::InvalidRequestState(_))
        ));
        assert!(matches!(
            decode(r#"{"requestType":"job"}"#),
            Err(ProtocolError::InvalidRequestState(_))
        ));
    }

    #[test]
    fn test_compression_needs_size() {
        let mut req = Request::new();
        req.set_compression_level(2);
        assert!(matches!(
            validate(&req),
            Err(ProtocolError::InvalidRequestState(_))
        ));
        req.set_uncompressed_size(0);
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn test_negative_identities_rejected() {
        let mut req = Request::new();
        req.set_client_id(-2);
        assert!(validate(&req).is_err());

        let mut req = Request::new();
        req.set_error(-5);
        assert!(validate(&req).is_err());

        let mut req = Request::new();
        req.set_request_type(RequestType::Group);
        req.set_group_id(-3);
        assert!(validate(&req).is_err());
    }

    #[test]
    fn test_negative_group_rejected_for_any_type() {
        for kind in [RequestType::Unspecified, RequestType::Universe] {
            let mut req = Request::new();
            req.set_request_type(kind);
            req.set_group_id(-7);
            assert!(matches!(
                validate(&req),
                Err(ProtocolError::InvalidRequestState(_))
            ));
            assert!(encode(&req).is_err());
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(validate(&Request::new()).is_ok());
    }
}
