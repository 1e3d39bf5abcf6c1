//! Configuration loading for MailPilot.
//!
//! Configuration is read once at process start and handed to each component
//! at construction; nothing reads the environment after that.
//!
//! # Usage
//!
//! ```rust,no_run
//! use mailconf::MailConfig;
//!
//! let config = MailConfig::load().expect("Failed to load config");
//! println!("Gemini model: {}", config.gemini.model);
//! println!("HTTP port: {}", config.bind.http_port);
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/mailpilot/config.toml` (system)
//! 2. `~/.config/mailpilot/config.toml` (user)
//! 3. `./mailpilot.toml` (local override, or the `--config` path)
//! 4. Environment variables (`GEMINI_*`, `ZAPIER_MCP_URL`, `MAILPILOT_*`)
//!
//! # Example Config
//!
//! ```toml
//! [gemini]
//! api_key = "AIza..."
//! model = "gemini-2.5-flash"
//!
//! [zapier]
//! mcp_url = "https://mcp.zapier.com/api/mcp/s/.../mcp"
//!
//! [bind]
//! host = "0.0.0.0"
//! http_port = 3000
//!
//! [telemetry]
//! log_level = "info"
//! otlp_endpoint = "127.0.0.1:4317"
//! ```

pub mod check;
pub mod loader;
pub mod sections;

pub use check::{check_config, CheckStatus, EnvReport, Verdict};
pub use loader::{discover_config_files_with_override, ConfigSources};
pub use sections::{BindConfig, GeminiConfig, TelemetryConfig, ZapierConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete MailPilot configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MailConfig {
    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub zapier: ZapierConfig,

    #[serde(default)]
    pub bind: BindConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl MailConfig {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration, letting `config_path` stand in for `./mailpilot.toml`.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration and report which files and variables contributed.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = MailConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            let layer = loader::load_from_file(&path)?;
            layer.apply_to(&mut config);
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MailConfig::default();
        assert_eq!(config.bind.http_port, 3000);
        assert!(config.zapier.mcp_url.is_none());
    }

    #[test]
    fn test_load_missing_override_is_ignored() {
        let missing = Path::new("/definitely/not/here/mailpilot.toml");
        assert!(MailConfig::load_from(Some(missing)).is_ok());
    }
}
