//! Error kinds for the generator and dispatcher.
//!
//! Nothing here crosses the operation surface in `service`; these are turned
//! into `success: false` outcomes there.

use courier::ClientError;
use thiserror::Error;

/// A failure talking to a remote provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure or timeout
    #[error("{0}")]
    Transport(String),

    /// Provider answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response could not be decoded
    #[error("{0}")]
    Protocol(String),

    /// Provider reported an error of its own
    #[error("{0}")]
    Logic(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Transport(format!("request timed out: {}", e))
        } else if e.is_decode() {
            ProviderError::Protocol(e.to_string())
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

impl From<ClientError> for ProviderError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Transport(m) => ProviderError::Transport(m),
            ClientError::Http { status, body } => ProviderError::Status { status, body },
            ClientError::Protocol(m) => ProviderError::Protocol(m),
            ClientError::Rpc { message, .. } => ProviderError::Logic(message),
        }
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    /// A required secret or URL is not configured
    #[error("{0}")]
    Configuration(String),

    #[error("Failed to generate email with Gemini: {0}")]
    Generation(#[source] ProviderError),

    #[error("Failed to send email via Zapier MCP: {0}")]
    Dispatch(#[source] ProviderError),
}

impl MailError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, MailError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_prefix() {
        let err = MailError::Dispatch(ProviderError::Logic("Rate limited".into()));
        assert_eq!(err.to_string(), "Failed to send email via Zapier MCP: Rate limited");
    }

    #[test]
    fn test_configuration_is_verbatim() {
        let err = MailError::Configuration("ZAPIER_MCP_URL is not configured".into());
        assert_eq!(err.to_string(), "ZAPIER_MCP_URL is not configured");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_client_error_mapping() {
        let err: ProviderError = ClientError::Rpc {
            code: Some(-32000),
            message: "boom".into(),
        }
        .into();
        assert!(matches!(err, ProviderError::Logic(ref m) if m == "boom"));

        let err: ProviderError = ClientError::Http {
            status: 503,
            body: "down".into(),
        }
        .into();
        assert_eq!(err.to_string(), "HTTP 503: down");
    }
}
