//! Program transport encodings.
//!
//! URL form: `?data=` + base64(percent-escaped(canonical JSON)). File form:
//! pretty-printed JSON of the same schema. Decoding either validates the whole
//! structure; a payload that fails any step is rejected, never partially applied.

pub mod storage;

pub use storage::{export_program, import_program};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;
use tracing::warn;

use crate::model::Program;

/// Characters left unescaped by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const QUERY_PARAM: &str = "data";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("no 'data' parameter in query")]
    MissingData,
    #[error("payload is not valid base64")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("payload has an invalid percent-escape")]
    PercentEscape(#[from] std::str::Utf8Error),
    #[error("payload does not match the program schema")]
    Schema(#[source] serde_json::Error),
    #[error("failed to serialize program")]
    Serialize(#[source] serde_json::Error),
}

/// Encode a program into its compact transport string.
pub fn encode(program: &Program) -> Result<String, CodecError> {
    let json = serde_json::to_string(program).map_err(CodecError::Serialize)?;
    let escaped = utf8_percent_encode(&json, URI_COMPONENT).to_string();
    Ok(STANDARD.encode(escaped))
}

/// Decode a transport string produced by [`encode`].
pub fn decode(transport: &str) -> Result<Program, CodecError> {
    let result = decode_transport(transport);
    if let Err(ref e) = result {
        warn!("Rejected program payload: {}", describe(e));
    }
    result
}

fn decode_transport(transport: &str) -> Result<Program, CodecError> {
    let bytes = STANDARD.decode(transport.trim())?;
    let escaped = String::from_utf8(bytes)?;
    let json = percent_decode_str(&escaped).decode_utf8()?;
    parse_program(&json)
}

/// Query string carrying the program, e.g. `?data=JTdCJTIy...`.
pub fn to_query(program: &Program) -> Result<String, CodecError> {
    let transport = encode(program)?;
    Ok(format!(
        "?{}={}",
        QUERY_PARAM,
        utf8_percent_encode(&transport, NON_ALPHANUMERIC)
    ))
}

/// Read the program from a query string, a full URL, or a bare transport string.
///
/// The `data` value may be escaped or raw; `+` is never read as a space.
pub fn from_query(query: &str) -> Result<Program, CodecError> {
    let result = query_value(query).and_then(|value| decode_transport(&value));
    if let Err(ref e) = result {
        warn!("Rejected program query: {}", describe(e));
    }
    result
}

fn query_value(query: &str) -> Result<String, CodecError> {
    let query = query.trim();
    let param = format!("{}=", QUERY_PARAM);

    let raw = match query.split_once('?') {
        Some((_, q)) => find_param(q)?,
        None if query.starts_with(&param) => find_param(query)?,
        // Bare transport; base64 padding means `=` alone does not make a query
        None => query,
    };

    Ok(percent_decode_str(raw).decode_utf8()?.into_owned())
}

fn find_param(query: &str) -> Result<&str, CodecError> {
    let query = query.split_once('#').map_or(query, |(q, _)| q);
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == QUERY_PARAM)
        .map(|(_, value)| value)
        .ok_or(CodecError::MissingData)
}

/// Pretty-printed JSON for file export.
pub fn to_pretty_json(program: &Program) -> Result<String, CodecError> {
    serde_json::to_string_pretty(program).map_err(CodecError::Serialize)
}

/// Parse and validate a program from JSON.
pub fn from_json(json: &str) -> Result<Program, CodecError> {
    let result = parse_program(json);
    if let Err(ref e) = result {
        warn!("Rejected program JSON: {}", describe(e));
    }
    result
}

/// Error with its causes, `outer: inner`.
fn describe(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn parse_program(json: &str) -> Result<Program, CodecError> {
    serde_json::from_str(json).map_err(CodecError::Schema)
}
