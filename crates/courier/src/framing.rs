//! Response body framing.
//!
//! Streamable HTTP servers may answer a POST with either a JSON document or a
//! `text/event-stream` body such as:
//!
//! ```text
//! event: message
//! data: {"jsonrpc":"2.0","id":1,"result":{...}}
//!
//! ```
//!
//! Both decode to the same JSON value. Only the first `data:` line carrying a
//! JSON object is read; multi-line data fields are not reassembled.

use serde_json::Value;

/// Message used when an event-stream body carries no JSON `data:` line.
pub const SSE_PARSE_ERROR: &str = "Could not parse SSE response";

const EVENT_STREAM: &str = "text/event-stream";
const MESSAGE_EVENT: &str = "event: message";

/// How a response body was delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum Framing {
    /// A bare JSON document.
    Plain(Value),
    /// JSON extracted from an event-stream `data:` line.
    Framed(Value),
    /// Neither form could be decoded.
    Unparseable(String),
}

impl Framing {
    /// The decoded JSON regardless of framing, or the reason it failed.
    pub fn into_value(self) -> Result<Value, String> {
        match self {
            Framing::Plain(v) | Framing::Framed(v) => Ok(v),
            Framing::Unparseable(reason) => Err(reason),
        }
    }

    pub fn is_framed(&self) -> bool {
        matches!(self, Framing::Framed(_))
    }
}

/// Decode a response body, using the content type as a hint.
///
/// A declared `text/event-stream` body is always read as a stream. Anything
/// else is tried as a JSON document first; the `event: message` marker is
/// only looked for when that fails, so a JSON payload that merely mentions
/// the marker stays plain.
pub fn parse_body(content_type: Option<&str>, body: &str) -> Framing {
    let declared_stream = content_type
        .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with(EVENT_STREAM))
        .unwrap_or(false);

    if declared_stream {
        return parse_event_stream(body);
    }

    if body.trim().is_empty() {
        return Framing::Unparseable("Empty response body".to_string());
    }

    match serde_json::from_str::<Value>(body) {
        Ok(value) => Framing::Plain(value),
        Err(_) if body.contains(MESSAGE_EVENT) => parse_event_stream(body),
        Err(e) => Framing::Unparseable(format!("Invalid JSON response: {}", e)),
    }
}

fn parse_event_stream(body: &str) -> Framing {
    let data = body
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .find(|payload| payload.starts_with('{'));

    match data {
        Some(payload) => match serde_json::from_str::<Value>(payload) {
            Ok(value) => Framing::Framed(value),
            Err(e) => Framing::Unparseable(format!("{}: {}", SSE_PARSE_ERROR, e)),
        },
        None => Framing::Unparseable(SSE_PARSE_ERROR.to_string()),
    }
}
