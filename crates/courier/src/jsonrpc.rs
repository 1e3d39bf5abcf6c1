//! JSON-RPC 2.0 envelope types as spoken by MCP endpoints.

use serde::Serialize;
use serde_json::Value;

/// JSON-RPC version constant - always "2.0".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonRpcVersion;

impl Serialize for JsonRpcVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str("2.0")
    }
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: JsonRpcVersion,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Create a new request with params.
    pub fn with_params(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            id,
            method: method.into(),
            params: Some(params),
        }
    }

    /// Build a `tools/call` request.
    pub fn tool_call(id: u64, name: &str, arguments: Value) -> Self {
        Self::with_params(
            id,
            "tools/call",
            serde_json::json!({
                "name": name,
                "arguments": arguments
            }),
        )
    }
}

/// JSON-RPC error object.
///
/// Hosted providers are loose about this shape: an `error` member that is
/// not an object still counts as an error, just one without a message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorData {
    pub code: Option<i64>,
    pub message: Option<String>,
    pub data: Option<Value>,
}

impl ErrorData {
    pub fn from_value(value: &Value) -> Self {
        Self {
            code: value.get("code").and_then(Value::as_i64),
            message: value.get("message").and_then(Value::as_str).map(str::to_string),
            data: value.get("data").cloned(),
        }
    }

    /// The error message, or `fallback` when the provider sent none.
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.message.as_deref() {
            Some(m) if !m.is_empty() => m,
            _ => fallback,
        }
    }
}

/// A decoded response envelope: either `result` or `error` is expected,
/// but neither is guaranteed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseEnvelope {
    /// Kept as sent; not validated.
    pub jsonrpc: Option<Value>,
    pub id: Option<Value>,
    pub result: Option<Value>,
    pub error: Option<ErrorData>,
}

impl ResponseEnvelope {
    /// Read an envelope out of any JSON value.
    ///
    /// Never fails. A non-object body is an envelope with neither member,
    /// and an `error` that is null, `false`, `0` or `""` is treated as absent.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Self::default();
        };

        Self {
            jsonrpc: map.remove("jsonrpc"),
            id: map.remove("id"),
            result: map.remove("result").filter(|v| !v.is_null()),
            error: map
                .remove("error")
                .filter(is_set)
                .map(|e| ErrorData::from_value(&e)),
        }
    }
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}
