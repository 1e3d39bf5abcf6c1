//! Configuration sections.
//!
//! Every field has a compiled default except the two secrets, which have
//! no sensible default and stay `None` until a file or env var supplies them.

use serde::{Deserialize, Serialize};

/// Gemini text-generation provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key from Google AI Studio. Usually starts with "AIza".
    #[serde(default)]
    pub api_key: Option<String>,

    /// Default: https://generativelanguage.googleapis.com
    #[serde(default = "GeminiConfig::default_base_url")]
    pub base_url: String,

    /// Default: gemini-2.5-flash
    #[serde(default = "GeminiConfig::default_model")]
    pub model: String,

    /// Default: 30
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GeminiConfig {
    fn default_base_url() -> String {
        "https://generativelanguage.googleapis.com".to_string()
    }

    fn default_model() -> String {
        "gemini-2.5-flash".to_string()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Self::default_base_url(),
            model: Self::default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// Hand-written so the key never lands in logs.
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Zapier MCP integration that performs the actual send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZapierConfig {
    /// Personal MCP endpoint URL, e.g. https://mcp.zapier.com/api/mcp/s/.../mcp
    #[serde(default)]
    pub mcp_url: Option<String>,

    /// Default: 30
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ZapierConfig {
    fn default() -> Self {
        Self {
            mcp_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// HTTP listener for the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindConfig {
    /// Default: 127.0.0.1
    #[serde(default = "BindConfig::default_host")]
    pub host: String,

    /// Default: 3000
    #[serde(default = "BindConfig::default_http_port")]
    pub http_port: u16,
}

impl BindConfig {
    fn default_host() -> String {
        "127.0.0.1".to_string()
    }

    fn default_http_port() -> u16 {
        3000
    }
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            http_port: Self::default_http_port(),
        }
    }
}

/// Telemetry and observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level or full EnvFilter directive.
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,

    /// OTLP gRPC endpoint. Export is disabled when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let gemini = GeminiConfig::default();
        assert!(gemini.api_key.is_none());
        assert_eq!(gemini.model, "gemini-2.5-flash");
        assert_eq!(gemini.timeout_secs, 30);

        assert_eq!(ZapierConfig::default().timeout_secs, 30);
        assert_eq!(BindConfig::default().http_port, 3000);
        assert_eq!(TelemetryConfig::default().log_level, "info");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let gemini = GeminiConfig {
            api_key: Some("AIzaSecretSecretSecret".to_string()),
            ..Default::default()
        };
        let printed = format!("{:?}", gemini);
        assert!(!printed.contains("AIzaSecret"));
        assert!(printed.contains("<redacted>"));
    }
}
