//! Client/server exchange tests
//!
//! Drives the dispatch server in-process through `run_with_io`, feeding it
//! lines produced by client sessions and reading back its responses.

use dags::{wire, ClientSettings, ErrorCode, Request, RequestType, Session, SessionError};
use dags_server::{Dispatcher, RpcHandler, ServerConfig};
use std::io::Cursor;

fn settings(app_name: &str, compression_level: u32) -> ClientSettings {
    ClientSettings {
        app_name: app_name.to_string(),
        version: "1.0".to_string(),
        compression_level,
    }
}

/// Send each request through the handler and decode the responses
fn exchange(handler: &mut RpcHandler, requests: &[Request]) -> Vec<Request> {
    let mut input = String::new();
    for request in requests {
        input.push_str(&wire::encode(request).unwrap());
        input.push('\n');
    }

    let mut output = Vec::new();
    let handled = handler
        .run_with_io(&mut Cursor::new(input.into_bytes()), &mut output)
        .unwrap();
    assert_eq!(handled, requests.len());

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| wire::decode(line).unwrap())
        .collect()
}

// =============================================================================
// Identity assignment
// =============================================================================

#[test]
fn test_session_receives_and_keeps_client_id() {
    let mut handler = RpcHandler::new(ServerConfig::default());
    let mut session = Session::new(settings("sim", 0));

    let hello = session.request(RequestType::Universe, None);
    let responses = exchange(&mut handler, &[hello]);
    session.accept(&responses[0]).unwrap();
    let id = session.client_id().expect("id assigned");

    let follow_up = session.request(RequestType::Group, Some(8));
    assert_eq!(follow_up.client_id(), id);

    let responses = exchange(&mut handler, &[follow_up]);
    assert!(responses[0].is_success());
    assert_eq!(responses[0].group_id(), 8);
    session.accept(&responses[0]).unwrap();
    assert_eq!(session.client_id(), Some(id));
    assert_eq!(handler.dispatcher().client_count(), 1);
}

#[test]
fn test_two_sessions_get_distinct_ids() {
    let mut handler = RpcHandler::new(ServerConfig::default());
    let mut a = Session::new(settings("a", 0));
    let mut b = Session::new(settings("b", 0));

    let responses = exchange(
        &mut handler,
        &[
            a.request(RequestType::Universe, None),
            b.request(RequestType::Universe, None),
        ],
    );
    a.accept(&responses[0]).unwrap();
    b.accept(&responses[1]).unwrap();

    assert_ne!(a.client_id(), b.client_id());
}

#[test]
fn test_resumed_session_unknown_to_new_server() {
    let mut handler = RpcHandler::new(ServerConfig::default());
    let mut session = Session::with_client_id(settings("sim", 0), 40);

    let responses = exchange(&mut handler, &[session.request(RequestType::Universe, None)]);
    let err = session.accept(&responses[0]).unwrap_err();
    assert_eq!(err.error_code(), Some(ErrorCode::UnknownClient));
}

// =============================================================================
// Payload compression
// =============================================================================

#[test]
fn test_compressed_payload_request_on_the_wire() {
    let session = Session::new(settings("sim", 3));
    let request = session.payload_request(RequestType::Job, Some(42), 10240);

    let line = wire::encode(&request).unwrap();
    let value: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["compressionLevel"], 3);
    assert_eq!(value["uncompressedSize"], 10240);
    assert_eq!(value["groupId"], 42);
    assert_eq!(value["requestType"], "job");
}

#[test]
fn test_server_rejects_excess_compression() {
    let mut handler = RpcHandler::new(ServerConfig {
        max_compression_level: 1,
        ..ServerConfig::default()
    });
    let mut session = Session::new(settings("sim", 5));

    let responses = exchange(
        &mut handler,
        &[session.payload_request(RequestType::Universe, None, 100)],
    );
    let err = session.accept(&responses[0]).unwrap_err();
    assert!(matches!(err, SessionError::Remote { .. }));
    assert_eq!(err.error_code(), Some(ErrorCode::CompressionUnsupported));
    assert!(session.client_id().is_none());
}

// =============================================================================
// Version and malformed input
// =============================================================================

#[test]
fn test_version_mismatch_reported_as_data() {
    let mut handler = RpcHandler::new(ServerConfig {
        supported_versions: vec!["2.0".to_string()],
        version: "2.0".to_string(),
        ..ServerConfig::default()
    });
    let session = Session::new(settings("sim", 0));

    let responses = exchange(&mut handler, &[session.request(RequestType::Universe, None)]);
    assert_eq!(
        responses[0].error_code(),
        Some(ErrorCode::UnsupportedVersion.code())
    );
    assert_eq!(responses[0].version(), "2.0");
}

#[test]
fn test_malformed_lines_do_not_stop_the_server() {
    let mut handler = RpcHandler::new(ServerConfig::default());
    let input = concat!(
        "{\"requestType\":\"constellation\"}\n",
        "{\"requestType\":\"job\",\"appName\":\"sim\",\"version\":\"1.0\"}\n",
        "{\"requestType\":\"universe\",\"version\":\"1.0\"}\n",
    );

    let mut output = Vec::new();
    let handled = handler
        .run_with_io(&mut Cursor::new(input.as_bytes().to_vec()), &mut output)
        .unwrap();
    assert_eq!(handled, 3);

    let responses: Vec<Request> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| wire::decode(line).unwrap())
        .collect();

    let invalid = Some(ErrorCode::InvalidRequest.code());
    assert_eq!(responses[0].error_code(), invalid);
    assert_eq!(responses[1].error_code(), invalid, "job without groupId");
    assert!(responses[2].is_success());
    assert_eq!(responses[2].client_id(), 1);
}

#[test]
fn test_dispatcher_echoes_effective_group_only() {
    let mut dispatcher = Dispatcher::new(ServerConfig::default());
    let mut request = Request::new();
    request.set_request_type(RequestType::Universe);
    request.set_version("1.0");
    request.set_group_id(99);

    let response = dispatcher.handle(&request);
    assert!(response.is_success());
    assert_eq!(response.group_id(), -1);
}
