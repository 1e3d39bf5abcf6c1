//! Caller-facing operations.
//!
//! Every operation returns a tagged outcome; errors from the generator or
//! dispatcher end up in `message` with `success: false`.

use std::sync::Arc;

use mailconf::MailConfig;
use serde::Serialize;
use serde_json::Value;

use crate::dispatcher::{MailDispatcher, SendRequest, ZapierDispatcher};
use crate::error::MailError;
use crate::generator::{ContentGenerator, GeminiGenerator};

pub const GENERATED_MESSAGE: &str = "Email generated successfully! Review and edit before sending.";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOutcome {
    pub success: bool,
    pub message: String,
    pub generated_body: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeOutcome {
    pub success: bool,
    pub message: String,
    pub generated_body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl ComposeOutcome {
    fn failed(err: &MailError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            generated_body: String::new(),
            result: None,
        }
    }
}

/// The generator and dispatcher behind one facade.
#[derive(Clone)]
pub struct MailService {
    generator: Arc<dyn ContentGenerator>,
    dispatcher: Arc<dyn MailDispatcher>,
}

impl MailService {
    pub fn new(generator: Arc<dyn ContentGenerator>, dispatcher: Arc<dyn MailDispatcher>) -> Self {
        Self {
            generator,
            dispatcher,
        }
    }

    /// Build the Gemini/Zapier pair from configuration.
    ///
    /// Fails if the MCP endpoint is missing. A missing Gemini key is only
    /// reported when generation is attempted, so plain sends still work.
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let dispatcher = ZapierDispatcher::new(&config.zapier)?;
        let generator = GeminiGenerator::new(&config.gemini);

        if !generator.is_configured() {
            tracing::warn!("GEMINI_API_KEY is not set; AI generation will fail until it is");
        }

        Ok(Self::new(Arc::new(generator), Arc::new(dispatcher)))
    }

    pub fn generator_configured(&self) -> bool {
        self.generator.is_configured()
    }

    pub fn dispatcher_configured(&self) -> bool {
        self.dispatcher.is_configured()
    }

    pub async fn generate_email_body(&self, prompt: &str) -> GenerateOutcome {
        generate_with(self.generator.as_ref(), prompt).await
    }

    pub async fn send_email(&self, to: &str, subject: &str, body: &str) -> SendOutcome {
        let request = SendRequest::new(to, subject, body);
        match self.dispatcher.send(&request).await {
            Ok(sent) => SendOutcome {
                success: sent.success,
                message: sent.message,
                result: sent.provider_result,
            },
            Err(e) => {
                tracing::error!(error = %e, "Error sending email");
                SendOutcome {
                    success: false,
                    message: e.to_string(),
                    result: None,
                }
            }
        }
    }

    /// Generate a body from `prompt`, then send it. Nothing is sent if
    /// generation fails.
    pub async fn generate_and_send_email(&self, to: &str, subject: &str, prompt: &str) -> ComposeOutcome {
        let body = match self.generator.generate(prompt).await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "Error generating AI email");
                return ComposeOutcome::failed(&e);
            }
        };

        let request = SendRequest::new(to, subject, body);
        match self.dispatcher.send(&request).await {
            Ok(sent) => ComposeOutcome {
                success: sent.success,
                message: sent.message,
                generated_body: request.body,
                result: sent.provider_result,
            },
            Err(e) => {
                tracing::error!(error = %e, "Error sending AI email");
                ComposeOutcome::failed(&e)
            }
        }
    }
}

/// Run a generator on its own, without a dispatcher behind it.
pub async fn generate_with(generator: &dyn ContentGenerator, prompt: &str) -> GenerateOutcome {
    match generator.generate(prompt).await {
        Ok(body) => GenerateOutcome {
            success: true,
            message: GENERATED_MESSAGE.to_string(),
            generated_body: body,
        },
        Err(e) => {
            tracing::error!(error = %e, "Error generating AI email");
            GenerateOutcome {
                success: false,
                message: e.to_string(),
                generated_body: String::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::SendResult;
    use crate::error::ProviderError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FixedGenerator(Result<&'static str, &'static str>);

    #[async_trait]
    impl ContentGenerator for FixedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, MailError> {
            match self.0 {
                Ok(body) => Ok(body.to_string()),
                Err(msg) => Err(MailError::Generation(ProviderError::Transport(msg.to_string()))),
            }
        }
    }

    #[derive(Default)]
    struct RecordingDispatcher {
        calls: AtomicUsize,
        last: Mutex<Option<SendRequest>>,
        fail_with: Option<&'static str>,
    }

    #[async_trait]
    impl MailDispatcher for RecordingDispatcher {
        async fn send(&self, request: &SendRequest) -> Result<SendResult, MailError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(request.clone());
            match self.fail_with {
                Some(msg) => Err(MailError::Dispatch(ProviderError::Logic(msg.to_string()))),
                None => Ok(SendResult {
                    success: true,
                    message: "Email sent successfully!".to_string(),
                    provider_result: Some(json!({ "ok": true })),
                }),
            }
        }
    }

    fn service(
        generator: FixedGenerator,
        dispatcher: Arc<RecordingDispatcher>,
    ) -> MailService {
        MailService::new(Arc::new(generator), dispatcher)
    }

    #[tokio::test]
    async fn test_generate_success() {
        let svc = service(FixedGenerator(Ok("Dear Ana,")), Arc::default());
        let outcome = svc.generate_email_body("thank Ana").await;
        assert!(outcome.success);
        assert_eq!(outcome.message, GENERATED_MESSAGE);
        assert_eq!(outcome.generated_body, "Dear Ana,");
    }

    #[tokio::test]
    async fn test_generate_failure_is_a_result() {
        let svc = service(FixedGenerator(Err("timed out")), Arc::default());
        let outcome = svc.generate_email_body("thank Ana").await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Failed to generate email with Gemini: timed out");
        assert!(outcome.generated_body.is_empty());
    }

    #[tokio::test]
    async fn test_send_success() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let svc = service(FixedGenerator(Ok("unused")), dispatcher.clone());

        let outcome = svc.send_email("a@b.com", "Hi", "Hello").await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Email sent successfully!");
        assert_eq!(outcome.result, Some(json!({ "ok": true })));
        assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_send_failure_is_a_result() {
        let dispatcher = Arc::new(RecordingDispatcher {
            fail_with: Some("quota"),
            ..Default::default()
        });
        let svc = service(FixedGenerator(Ok("unused")), dispatcher);

        let outcome = svc.send_email("a@b.com", "Hi", "Hello").await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Failed to send email via Zapier MCP: quota");
        assert!(outcome.result.is_none());
    }

    #[tokio::test]
    async fn test_compose_sends_generated_body() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let svc = service(FixedGenerator(Ok("Thanks so much!")), dispatcher.clone());

        let outcome = svc
            .generate_and_send_email("a@b.com", "Hi", "write a thank-you note")
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.generated_body, "Thanks so much!");

        let sent = dispatcher.last.lock().unwrap().clone().unwrap();
        assert_eq!(sent.to, "a@b.com");
        assert_eq!(sent.subject, "Hi");
        assert_eq!(sent.body, "Thanks so much!");
    }

    #[tokio::test]
    async fn test_compose_skips_dispatch_when_generation_fails() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let svc = service(FixedGenerator(Err("connection refused")), dispatcher.clone());

        let outcome = svc
            .generate_and_send_email("a@b.com", "Hi", "write a thank-you note")
            .await;
        assert!(!outcome.success);
        assert_eq!(
            outcome.message,
            "Failed to generate email with Gemini: connection refused"
        );
        assert!(outcome.generated_body.is_empty());
        assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_compose_send_failure_clears_body() {
        let dispatcher = Arc::new(RecordingDispatcher {
            fail_with: Some("quota"),
            ..Default::default()
        });
        let svc = service(FixedGenerator(Ok("Thanks!")), dispatcher);

        let outcome = svc.generate_and_send_email("a@b.com", "Hi", "thanks").await;
        assert!(!outcome.success);
        assert!(outcome.generated_body.is_empty());
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = GenerateOutcome {
            success: true,
            message: "ok".into(),
            generated_body: "body".into(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, json!({ "success": true, "message": "ok", "generatedBody": "body" }));

        let outcome = SendOutcome {
            success: false,
            message: "nope".into(),
            result: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("result").is_none());
    }

    #[test]
    fn test_from_config_requires_mcp_url() {
        let err = MailService::from_config(&MailConfig::default()).err().unwrap();
        assert!(err.is_configuration());
    }
}
