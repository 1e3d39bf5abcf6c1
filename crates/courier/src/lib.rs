//! courier - a small MCP tool-call client.
//!
//! Hosted MCP integrations (Zapier and friends) accept JSON-RPC `tools/call`
//! requests over plain HTTP POST, but answer in one of two shapes: a bare
//! JSON document, or a `text/event-stream` body with the JSON document
//! embedded after a `data:` marker. This crate hides that difference.
//!
//! - `jsonrpc`: request/response envelope types
//! - `framing`: response body → `Framing` (plain, framed, or unparseable)
//! - `client`: `ToolClient`, one POST per tool call
//!
//! # Example
//!
//! ```rust,ignore
//! use courier::{ClientOptions, ToolClient};
//!
//! let client = ToolClient::with_options("https://mcp.example.com/mcp", ClientOptions::default());
//! let result = client.call_tool("gmail_send_email", json!({"to": ["a@b.com"]})).await?;
//! ```

pub mod client;
pub mod framing;
pub mod jsonrpc;

pub use client::{ClientError, ClientOptions, ToolClient};
pub use framing::{parse_body, Framing};
pub use jsonrpc::{ErrorData, JsonRpcRequest, ResponseEnvelope};
