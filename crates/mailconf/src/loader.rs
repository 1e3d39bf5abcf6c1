//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, MailConfig};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local). Only returns files
/// that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/mailpilot/config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or ~/.config
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("mailpilot/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("mailpilot.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// One file's worth of settings. Absent keys leave earlier layers alone.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    #[serde(default)]
    gemini: GeminiLayer,
    #[serde(default)]
    zapier: ZapierLayer,
    #[serde(default)]
    bind: BindLayer,
    #[serde(default)]
    telemetry: TelemetryLayer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GeminiLayer {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ZapierLayer {
    mcp_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BindLayer {
    host: Option<String>,
    http_port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TelemetryLayer {
    log_level: Option<String>,
    otlp_endpoint: Option<String>,
}

impl ConfigLayer {
    /// Overlay this layer onto `config`.
    pub fn apply_to(self, config: &mut MailConfig) {
        overlay(&mut config.gemini.api_key, self.gemini.api_key.map(Some));
        overlay(&mut config.gemini.base_url, self.gemini.base_url);
        overlay(&mut config.gemini.model, self.gemini.model);
        overlay(&mut config.gemini.timeout_secs, self.gemini.timeout_secs);

        overlay(&mut config.zapier.mcp_url, self.zapier.mcp_url.map(Some));
        overlay(&mut config.zapier.timeout_secs, self.zapier.timeout_secs);

        overlay(&mut config.bind.host, self.bind.host);
        overlay(&mut config.bind.http_port, self.bind.http_port);

        overlay(&mut config.telemetry.log_level, self.telemetry.log_level);
        overlay(&mut config.telemetry.otlp_endpoint, self.telemetry.otlp_endpoint.map(Some));
    }
}

fn overlay<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

/// Load a config layer from a TOML file.
pub fn load_from_file(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_toml(&contents, path)
}

fn parse_toml(contents: &str, path: &Path) -> Result<ConfigLayer, ConfigError> {
    toml::from_str(contents).map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut MailConfig, sources: &mut ConfigSources) {
    apply_env_overrides_with(config, sources, |key| env::var(key).ok());
}

/// Apply overrides from an arbitrary lookup. Empty values are ignored.
pub fn apply_env_overrides_with<F>(config: &mut MailConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    // Provider secrets keep the names the hosted dashboards hand out
    if let Some(v) = get("GEMINI_API_KEY") {
        config.gemini.api_key = Some(v);
        sources.env_overrides.push("GEMINI_API_KEY".to_string());
    }
    if let Some(v) = get("GEMINI_MODEL") {
        config.gemini.model = v;
        sources.env_overrides.push("GEMINI_MODEL".to_string());
    }
    if let Some(v) = get("GEMINI_BASE_URL") {
        config.gemini.base_url = v;
        sources.env_overrides.push("GEMINI_BASE_URL".to_string());
    }
    if let Some(v) = get("ZAPIER_MCP_URL") {
        config.zapier.mcp_url = Some(v);
        sources.env_overrides.push("ZAPIER_MCP_URL".to_string());
    }

    // Bind
    if let Some(v) = get("MAILPILOT_HOST") {
        config.bind.host = v;
        sources.env_overrides.push("MAILPILOT_HOST".to_string());
    }
    if let Some(v) = get("MAILPILOT_HTTP_PORT") {
        if let Ok(port) = v.parse() {
            config.bind.http_port = port;
            sources.env_overrides.push("MAILPILOT_HTTP_PORT".to_string());
        }
    }

    // Telemetry
    if let Some(v) = get("MAILPILOT_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("MAILPILOT_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Some(v) = get("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
    if let Some(v) = get("MAILPILOT_OTLP_ENDPOINT") {
        config.telemetry.otlp_endpoint = Some(v);
        sources.env_overrides.push("MAILPILOT_OTLP_ENDPOINT".to_string());
    }
    // Also support standard OTEL env var
    if let Some(v) = get("OTEL_EXPORTER_OTLP_ENDPOINT") {
        config.telemetry.otlp_endpoint = Some(v);
        sources.env_overrides.push("OTEL_EXPORTER_OTLP_ENDPOINT".to_string());
    }
}
