//! Streamable HTTP tool-call client.
//!
//! One `tools/call` per HTTP POST. No session handshake is performed: hosted
//! integration endpoints accept bare tool calls, and the response is read
//! back through [`crate::framing`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;

use crate::framing::parse_body;
use crate::jsonrpc::{JsonRpcRequest, ResponseEnvelope};

/// Fallback when an error envelope has no message.
pub const DEFAULT_RPC_ERROR: &str = "MCP request failed";

const ACCEPT_BOTH: &str = "application/json, text/event-stream";

/// Options for configuring the tool client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// MCP client for one tool endpoint.
///
/// Safe to share across tasks; request ids come from an atomic counter.
pub struct ToolClient {
    base_url: String,
    client: Client,
    request_id: AtomicU64,
    options: ClientOptions,
}

impl ToolClient {
    /// Create a client for the given MCP endpoint URL.
    pub fn new(base_url: &str) -> Self {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a client with custom options.
    pub fn with_options(base_url: &str, options: ClientOptions) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            request_id: AtomicU64::new(1),
            options,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.options.timeout_secs)
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Call a tool and return the `result` member of the response.
    ///
    /// An `error` member becomes [`ClientError::Rpc`]. A response with
    /// neither member yields `Value::Null`.
    #[tracing::instrument(skip(self, arguments), fields(tool.name = %name, mcp.request_id = tracing::field::Empty))]
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, ClientError> {
        let id = self.next_id();
        tracing::Span::current().record("mcp.request_id", id);

        let request = JsonRpcRequest::tool_call(id, name, arguments);
        let envelope = self.send_request(&request).await?;

        if let Some(error) = envelope.error {
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message_or(DEFAULT_RPC_ERROR).to_string(),
            });
        }

        Ok(envelope.result.unwrap_or(Value::Null))
    }

    /// POST a request and decode the response envelope, whichever framing
    /// the server chose.
    pub async fn send_request(&self, request: &JsonRpcRequest) -> Result<ResponseEnvelope, ClientError> {
        let mut req_builder = self
            .client
            .post(&self.base_url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, ACCEPT_BOTH)
            .timeout(self.timeout());

        if let Some(tp) = current_traceparent() {
            req_builder = req_builder.header("traceparent", tp);
        }

        let response = req_builder
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(describe_reqwest_error(e)))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(describe_reqwest_error(e)))?;

        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let framing = parse_body(content_type.as_deref(), &body);
        let framed = framing.is_framed();
        let value = framing.into_value().map_err(ClientError::Protocol)?;

        tracing::debug!(
            framed,
            envelope = %serde_json::to_string_pretty(&value).unwrap_or_default(),
            "Parsed MCP response"
        );

        Ok(ResponseEnvelope::from_value(value))
    }
}

/// The endpoint URL carries a secret path token, so it is stripped first.
fn describe_reqwest_error(e: reqwest::Error) -> String {
    let e = e.without_url();
    if e.is_timeout() {
        format!("request timed out: {}", e)
    } else {
        e.to_string()
    }
}

/// Extract traceparent from the current span for distributed tracing.
fn current_traceparent() -> Option<String> {
    use opentelemetry::trace::TraceContextExt;
    use tracing_opentelemetry::OpenTelemetrySpanExt;

    let span = tracing::Span::current();
    let context = span.context();
    let ctx_span = context.span();
    let span_context = ctx_span.span_context();

    if span_context.is_valid() {
        let flags = if span_context.is_sampled() { "01" } else { "00" };
        Some(format!(
            "00-{}-{}-{}",
            span_context.trace_id(),
            span_context.span_id(),
            flags
        ))
    } else {
        None
    }
}

/// Errors that can occur when calling a tool.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection failure or timeout
    #[error("{0}")]
    Transport(String),

    /// Non-2xx HTTP status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The body could not be decoded into an envelope
    #[error("{0}")]
    Protocol(String),

    /// The envelope carried an `error` member
    #[error("{message}")]
    Rpc { code: Option<i64>, message: String },
}

impl ClientError {
    /// True when the response arrived but could not be decoded.
    pub fn is_protocol(&self) -> bool {
        matches!(self, ClientError::Protocol(_))
    }
}
