//! Prompt-to-content generation via the Gemini `generateContent` API.

use std::time::Duration;

use async_trait::async_trait;
use mailconf::GeminiConfig;
use serde::{Deserialize, Serialize};

use crate::error::{MailError, ProviderError};

/// Returned when the provider answers but yields no usable text.
pub const FALLBACK_BODY: &str = "Sorry, could not generate email.";

/// Produces one finished email body from a free-text prompt.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, MailError>;

    /// Whether the generator has what it needs to make a call.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Wrap a raw prompt in the instructions that keep Gemini to a single,
/// ready-to-send body.
pub fn build_prompt(prompt: &str) -> String {
    format!(
        "You are a professional email writing assistant. Write a single, complete email body based on the request below.

IMPORTANT RULES:
- Generate ONLY the email body content (no subject lines)
- Do NOT provide multiple options or alternatives
- Do NOT include explanations, instructions, or notes
- Do NOT use placeholders like [Your Name] or [Recipient's Name]
- Write ONE complete, ready-to-send email
- Use a professional but friendly tone
- Format with proper paragraphs and line breaks
- Use natural, real language throughout

Request: {prompt}

Email body:"
    )
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`, if non-empty.
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.is_empty())
    }
}

/// Gemini-backed [`ContentGenerator`].
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl GeminiGenerator {
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ContentGenerator for GeminiGenerator {
    #[tracing::instrument(skip(self, prompt), fields(gemini.model = %self.model, prompt.len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, MailError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| MailError::Configuration("GEMINI_API_KEY is not configured".to_string()))?;

        let full_prompt = build_prompt(prompt);
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: &full_prompt }],
            }],
        };

        // without_url(): the key rides in the query string
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| MailError::Generation(e.without_url().into()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MailError::Generation(e.without_url().into()))?;

        if !status.is_success() {
            tracing::error!(status = status.as_u16(), body = %body, "Gemini API error");
            return Err(MailError::Generation(ProviderError::Status {
                status: status.as_u16(),
                body,
            }));
        }

        let parsed = match serde_json::from_str::<GenerateContentResponse>(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Gemini response was not the expected JSON");
                GenerateContentResponse::default()
            }
        };

        match parsed.first_text() {
            Some(text) => {
                tracing::info!(chars = text.len(), "Generated email body");
                Ok(text)
            }
            None => {
                tracing::warn!("Gemini returned no candidate text, using fallback");
                Ok(FALLBACK_BODY.to_string())
            }
        }
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
