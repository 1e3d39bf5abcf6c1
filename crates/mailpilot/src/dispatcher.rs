//! Message dispatch through the Zapier MCP `gmail_send_email` tool.

use async_trait::async_trait;
use courier::{ClientError, ClientOptions, ToolClient};
use mailconf::ZapierConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MailError, ProviderError};

/// Tool name registered by Zapier's "Gmail - Send Email" action.
pub const SEND_TOOL: &str = "gmail_send_email";

pub const SUCCESS_MESSAGE: &str = "Email sent successfully!";

const GMAIL_SETUP_GUIDANCE: &str = "Gmail is not configured in your Zapier MCP. Please go to \
https://mcp.zapier.com and add the \"Gmail - Send Email\" action, then connect your Gmail account.";

/// Provider error substrings that get replaced with setup guidance.
///
/// Matching is plain substring containment; anything not listed here is
/// passed through untouched.
const KNOWN_ERRORS: &[(&str, &str)] = &[
    ("Tool gmail_send_email not found", GMAIL_SETUP_GUIDANCE),
    ("Tool mcp_Zapier_gmail_send_email not found", GMAIL_SETUP_GUIDANCE),
];

/// Map a provider error message to what the operator should see.
pub fn classify_error(message: &str) -> &str {
    KNOWN_ERRORS
        .iter()
        .find(|(needle, _)| message.contains(needle))
        .map(|(_, guidance)| *guidance)
        .unwrap_or(message)
}

/// A message ready to send. `to` is a single address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl SendRequest {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Arguments for the send tool. The instruction sentence restates the
    /// fields because Zapier's AI action reads it alongside them.
    pub fn tool_arguments(&self) -> Value {
        serde_json::json!({
            "instructions": format!(
                "Send an email to {} with subject \"{}\" and body: {}",
                self.to, self.subject, self.body
            ),
            "to": [self.to],
            "subject": self.subject,
            "body": self.body,
        })
    }
}

/// Dispatcher-level result; callers see it as a `SendOutcome`.
#[derive(Debug, Clone)]
pub struct SendResult {
    pub success: bool,
    pub message: String,
    pub provider_result: Option<Value>,
}

/// Delivers a finished message.
#[async_trait]
pub trait MailDispatcher: Send + Sync {
    async fn send(&self, request: &SendRequest) -> Result<SendResult, MailError>;

    fn is_configured(&self) -> bool {
        true
    }
}

/// [`MailDispatcher`] backed by a Zapier MCP endpoint.
pub struct ZapierDispatcher {
    client: ToolClient,
}

impl ZapierDispatcher {
    /// Fails when no endpoint URL is configured; this is checked once, here.
    pub fn new(config: &ZapierConfig) -> Result<Self, MailError> {
        let url = config
            .mcp_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| MailError::Configuration("ZAPIER_MCP_URL is not configured".to_string()))?;

        let client = ToolClient::with_options(
            url,
            ClientOptions {
                timeout_secs: config.timeout_secs,
            },
        );

        Ok(Self { client })
    }
}

#[async_trait]
impl MailDispatcher for ZapierDispatcher {
    #[tracing::instrument(skip(self, request), fields(mail.to = %request.to))]
    async fn send(&self, request: &SendRequest) -> Result<SendResult, MailError> {
        let result = match self.client.call_tool(SEND_TOOL, request.tool_arguments()).await {
            Ok(result) => result,
            Err(ClientError::Rpc { message, .. }) => {
                tracing::error!(error = %message, "Zapier MCP returned an error");
                let message = classify_error(&message).to_string();
                return Err(MailError::Dispatch(ProviderError::Logic(message)));
            }
            Err(e) => {
                tracing::error!(error = %e, "Zapier MCP request failed");
                return Err(MailError::Dispatch(e.into()));
            }
        };

        if let Some(content) = result.get("content") {
            tracing::info!(content = %content, "MCP result content");
        }
        // Reported, not acted on: the envelope itself carried no error
        if result.get("isError").and_then(Value::as_bool) == Some(true) {
            tracing::warn!("MCP tool result is flagged isError");
        }

        Ok(SendResult {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
            provider_result: (!result.is_null()).then_some(result),
        })
    }
}
