//! Logic behind the `dags` subcommands, kept out of the binary so it can be
//! exercised without spawning a process.

use std::fmt::Write;

use dags_protocol::{wire, ErrorCode, ProtocolError, Request, RequestKey, RequestType};
use tracing::debug;

use crate::config::{ClientSettings, ConfigError, EffectiveConfig};
use crate::session::Session;

/// Arguments of `dags build`
#[derive(Debug, Clone, Default)]
pub struct BuildArgs {
    pub kind: RequestType,
    pub group: Option<i32>,
    pub payload_size: Option<u32>,
    pub client_id: Option<i32>,
}

/// Build and encode a request line for `dags build`.
pub fn build_request(settings: ClientSettings, args: &BuildArgs) -> Result<String, ProtocolError> {
    let session = match args.client_id {
        Some(id) => Session::with_client_id(settings, id),
        None => Session::new(settings),
    };

    let request = match args.payload_size {
        Some(size) => session.payload_request(args.kind, args.group, size),
        None => session.request(args.kind, args.group),
    };
    debug!(key = ?RequestKey::of(&request), "built request");

    wire::encode(&request)
}

/// Decode and validate the input of `dags check`.
pub fn check_request(input: &str) -> Result<Request, ProtocolError> {
    wire::decode(input)
}

/// Human-readable summary printed by `dags check`.
pub fn summary(request: &Request) -> String {
    let id = |v: Option<i32>| v.map_or_else(|| "unset".to_string(), |v| v.to_string());
    let mut out = String::new();

    let _ = writeln!(out, "Request valid");
    let _ = writeln!(out);
    let _ = writeln!(out, "  Client id:    {}", id(request.assigned_client_id()));
    let _ = match request.error_code() {
        None => writeln!(out, "  Error:        none"),
        Some(code) => match ErrorCode::from_code(code) {
            Some(known) => writeln!(out, "  Error:        {} ({})", code, known),
            None => writeln!(out, "  Error:        {}", code),
        },
    };
    let kind = request.request_type();
    let _ = writeln!(
        out,
        "  Type:         {}",
        if kind == RequestType::Unspecified { "unspecified" } else { kind.as_str() }
    );
    let _ = writeln!(out, "  Application:  {}", request.app_name());
    let _ = writeln!(out, "  Group id:     {}", id(request.effective_group_id()));
    let _ = writeln!(out, "  Version:      {}", request.version());
    let _ = match request.payload_size() {
        Some(size) => writeln!(
            out,
            "  Compression:  level {} ({} bytes uncompressed)",
            request.compression_level(),
            size
        ),
        None => writeln!(out, "  Compression:  none"),
    };
    out
}

/// JSON report printed by `dags config`.
pub fn config_report(config: &EffectiveConfig) -> Result<String, ConfigError> {
    config
        .to_json()
        .map_err(|e| ConfigError::ParseError(format!("JSON serialization failed: {}", e)))
}
