//! MailPilot: draft email bodies with Gemini and send them through a
//! Zapier MCP Gmail action.

pub mod dispatcher;
pub mod error;
pub mod generator;
pub mod service;
pub mod telemetry;
pub mod web;

pub use dispatcher::{classify_error, MailDispatcher, SendRequest, SendResult, ZapierDispatcher};
pub use error::{MailError, ProviderError};
pub use generator::{build_prompt, ContentGenerator, GeminiGenerator, FALLBACK_BODY};
pub use service::{generate_with, ComposeOutcome, GenerateOutcome, MailService, SendOutcome};
