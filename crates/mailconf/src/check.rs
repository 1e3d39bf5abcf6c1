//! Environment checker behind `mailpilot check-env`.
//!
//! Validates the effective configuration (files + env) rather than the raw
//! process environment, so a key supplied via `mailpilot.toml` counts.

use std::fmt;

use crate::MailConfig;

/// Outcome of checking one setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Ok { masked: String },
    InvalidFormat { preview: String },
    Missing,
}

/// A required setting and what was found.
#[derive(Debug, Clone)]
pub struct RequiredEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub format: &'static str,
    pub status: CheckStatus,
}

/// An optional setting; only reported, never fails the check.
#[derive(Debug, Clone)]
pub struct OptionalEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    PassedWithWarnings,
    Failed,
}

#[derive(Debug, Clone)]
pub struct EnvReport {
    pub required: Vec<RequiredEntry>,
    pub optional: Vec<OptionalEntry>,
}

impl EnvReport {
    pub fn verdict(&self) -> Verdict {
        let statuses = || self.required.iter().map(|e| &e.status);
        if statuses().any(|s| *s == CheckStatus::Missing) {
            Verdict::Failed
        } else if statuses().any(|s| matches!(s, CheckStatus::InvalidFormat { .. })) {
            Verdict::PassedWithWarnings
        } else {
            Verdict::Passed
        }
    }
}

struct Rule {
    name: &'static str,
    description: &'static str,
    format: &'static str,
    prefix: &'static str,
}

const GEMINI_RULE: Rule = Rule {
    name: "GEMINI_API_KEY",
    description: "Gemini API key from Google AI Studio",
    format: "Should start with \"AIza\"",
    prefix: "AIza",
};

const ZAPIER_RULE: Rule = Rule {
    name: "ZAPIER_MCP_URL",
    description: "Zapier MCP endpoint URL",
    format: "Should start with \"https://mcp.zapier.com\"",
    prefix: "https://mcp.zapier.com",
};

/// Check the settings MailPilot cannot run without.
pub fn check_config(config: &MailConfig) -> EnvReport {
    let required = vec![
        check_required(&GEMINI_RULE, config.gemini.api_key.as_deref()),
        check_required(&ZAPIER_RULE, config.zapier.mcp_url.as_deref()),
    ];

    let optional = vec![
        OptionalEntry {
            name: "MAILPILOT_OTLP_ENDPOINT",
            description: "OTLP gRPC endpoint for traces and logs",
            value: config.telemetry.otlp_endpoint.clone(),
        },
        OptionalEntry {
            name: "MAILPILOT_LOG_LEVEL",
            description: "Log level or tracing filter directive",
            value: Some(config.telemetry.log_level.clone()),
        },
    ];

    EnvReport { required, optional }
}

fn check_required(rule: &Rule, value: Option<&str>) -> RequiredEntry {
    let status = match value {
        None | Some("") => CheckStatus::Missing,
        Some(v) if !v.starts_with(rule.prefix) => CheckStatus::InvalidFormat {
            preview: format!("{}...", take_chars(v, 20)),
        },
        Some(v) => CheckStatus::Ok { masked: mask(v) },
    };

    RequiredEntry {
        name: rule.name,
        description: rule.description,
        format: rule.format,
        status,
    }
}

/// Mask a secret for display.
///
/// Long values keep the first 15 and last 5 characters; short ones keep
/// the first 10.
pub fn mask(value: &str) -> String {
    let len = value.chars().count();
    if len > 20 {
        let tail: String = value.chars().skip(len - 5).collect();
        format!("{}...{}", take_chars(value, 15), tail)
    } else {
        format!("{}...", take_chars(value, 10))
    }
}

fn take_chars(value: &str, n: usize) -> String {
    value.chars().take(n).collect()
}

impl fmt::Display for EnvReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Checking MailPilot configuration...\n")?;
        writeln!(f, "Required settings:\n")?;

        for entry in &self.required {
            match &entry.status {
                CheckStatus::Ok { masked } => {
                    writeln!(f, "✅ {}: {}", entry.name, masked)?;
                    writeln!(f, "   {}\n", entry.description)?;
                }
                CheckStatus::InvalidFormat { preview } => {
                    writeln!(f, "⚠️  {}: INVALID FORMAT", entry.name)?;
                    writeln!(f, "   Current: {}", preview)?;
                    writeln!(f, "   Expected: {}\n", entry.format)?;
                }
                CheckStatus::Missing => {
                    writeln!(f, "❌ {}: MISSING", entry.name)?;
                    writeln!(f, "   {}", entry.description)?;
                    writeln!(f, "   Format: {}\n", entry.format)?;
                }
            }
        }

        writeln!(f, "Optional settings:\n")?;
        for entry in &self.optional {
            match &entry.value {
                Some(v) => writeln!(f, "✅ {}: {}", entry.name, v)?,
                None => writeln!(f, "ℹ️  {}: Not set (optional)", entry.name)?,
            }
            writeln!(f, "   {}\n", entry.description)?;
        }

        writeln!(f, "{}\n", "=".repeat(60))?;

        match self.verdict() {
            Verdict::Failed => {
                writeln!(f, "❌ Configuration check FAILED\n")?;
                writeln!(f, "Set the missing values in mailpilot.toml or the environment:\n")?;
                writeln!(f, "   GEMINI_API_KEY=your_gemini_api_key")?;
                writeln!(f, "   ZAPIER_MCP_URL=your_zapier_mcp_url\n")?;
                writeln!(f, "Get them from:")?;
                writeln!(f, "   - Gemini: https://makersuite.google.com/app/apikey")?;
                writeln!(f, "   - Zapier MCP: https://mcp.zapier.com")
            }
            Verdict::PassedWithWarnings => {
                writeln!(f, "⚠️  Configuration check PASSED with warnings\n")?;
                writeln!(f, "Some values may have invalid formats. Please verify they are correct.")
            }
            Verdict::Passed => {
                writeln!(f, "✅ Configuration check PASSED\n")?;
                writeln!(f, "You can now run: mailpilot serve")
            }
        }
    }
}
