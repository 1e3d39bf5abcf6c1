//! Dispatch and end-to-end compose against mock Zapier and Gemini servers.

use std::sync::Arc;

use mailconf::{GeminiConfig, MailConfig, ZapierConfig};
use mailpilot::{GeminiGenerator, MailService, ZapierDispatcher};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MCP_PATH: &str = "/api/mcp/s/secret/mcp";

fn success_envelope() -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {
            "content": [{ "type": "text", "text": "{\"messageId\":\"18c\"}" }],
            "isError": false
        }
    })
}

fn service_for(zapier: &MockServer, gemini: Option<&MockServer>) -> MailService {
    let config = MailConfig {
        gemini: GeminiConfig {
            api_key: gemini.map(|_| "AIzaTestKey".to_string()),
            base_url: gemini
                .map(|s| s.uri())
                .unwrap_or_else(|| "http://127.0.0.1:9".to_string()),
            ..Default::default()
        },
        zapier: ZapierConfig {
            mcp_url: Some(format!("{}{}", zapier.uri(), MCP_PATH)),
            ..Default::default()
        },
        ..Default::default()
    };
    MailService::from_config(&config).unwrap()
}

#[tokio::test]
async fn test_send_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MCP_PATH))
        .and(body_partial_json(json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": {
                "name": "gmail_send_email",
                "arguments": { "to": ["a@b.com"], "subject": "Hi", "body": "Hello" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_envelope()))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = service_for(&server, None).send_email("a@b.com", "Hi", "Hello").await;
    assert!(outcome.success);
    assert_eq!(outcome.message, "Email sent successfully!");
    assert_eq!(outcome.result, Some(success_envelope()["result"].clone()));
}

#[tokio::test]
async fn test_event_stream_matches_plain_json() {
    let plain = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_envelope()))
        .mount(&plain)
        .await;

    let sse = MockServer::start().await;
    let framed = format!("event: message\ndata: {}\n\n", success_envelope());
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(framed, "text/event-stream"))
        .mount(&sse)
        .await;

    let from_plain = service_for(&plain, None).send_email("a@b.com", "Hi", "Hello").await;
    let from_sse = service_for(&sse, None).send_email("a@b.com", "Hi", "Hello").await;

    assert!(from_sse.success);
    assert_eq!(from_sse.message, from_plain.message);
    assert_eq!(from_sse.result, from_plain.result);
}

#[tokio::test]
async fn test_plain_json_echoing_stream_marker_is_success() {
    let server = MockServer::start().await;
    let envelope = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": { "content": [{ "type": "text", "text": "sent body: event: message" }] }
    });
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope.clone()))
        .mount(&server)
        .await;

    let outcome = service_for(&server, None)
        .send_email("a@b.com", "Hi", "event: message")
        .await;
    assert!(outcome.success);
    assert_eq!(outcome.result, Some(envelope["result"].clone()));
}

#[tokio::test]
async fn test_transport_error_does_not_leak_mcp_token() {
    let config = ZapierConfig {
        mcp_url: Some("http://127.0.0.1:9/api/mcp/s/SUPERSECRETTOKEN/mcp".to_string()),
        timeout_secs: 2,
    };
    let service = MailService::new(
        Arc::new(GeminiGenerator::new(&GeminiConfig::default())),
        Arc::new(ZapierDispatcher::new(&config).unwrap()),
    );

    let outcome = service.send_email("a@b.com", "Hi", "Hello").await;
    assert!(!outcome.success);
    assert!(outcome.message.starts_with("Failed to send email via Zapier MCP: "));
    assert!(!outcome.message.contains("SUPERSECRETTOKEN"));
}

#[tokio::test]
async fn test_string_error_member_uses_default_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": "boom"
        })))
        .mount(&server)
        .await;

    let outcome = service_for(&server, None).send_email("a@b.com", "Hi", "Hello").await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Failed to send email via Zapier MCP: MCP request failed");
}

#[tokio::test]
async fn test_non_object_body_is_success_without_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("queued")))
        .mount(&server)
        .await;

    let outcome = service_for(&server, None).send_email("a@b.com", "Hi", "Hello").await;
    assert!(outcome.success);
    assert_eq!(outcome.message, "Email sent successfully!");
    assert!(outcome.result.is_none());
}

#[tokio::test]
async fn test_numeric_version_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": 2.0,
            "id": 1,
            "result": { "content": [] }
        })))
        .mount(&server)
        .await;

    let outcome = service_for(&server, None).send_email("a@b.com", "Hi", "Hello").await;
    assert!(outcome.success);
}

#[tokio::test]
async fn test_event_stream_without_data_line() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("event: message\n: keepalive\n\n", "text/event-stream"),
        )
        .mount(&server)
        .await;

    let outcome = service_for(&server, None).send_email("a@b.com", "Hi", "Hello").await;
    assert!(!outcome.success);
    assert!(outcome.message.contains("Could not parse SSE response"));
}

#[tokio::test]
async fn test_tool_not_found_becomes_guidance() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32602, "message": "Tool gmail_send_email not found" }
        })))
        .mount(&server)
        .await;

    let outcome = service_for(&server, None).send_email("a@b.com", "Hi", "Hello").await;
    assert!(!outcome.success);
    assert!(outcome.message.contains("Gmail is not configured in your Zapier MCP"));
    assert!(outcome.message.contains("https://mcp.zapier.com"));
    assert!(!outcome.message.contains("Tool gmail_send_email not found"));
}

#[tokio::test]
async fn test_other_rpc_errors_pass_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32000, "message": "Rate limit exceeded" }
        })))
        .mount(&server)
        .await;

    let outcome = service_for(&server, None).send_email("a@b.com", "Hi", "Hello").await;
    assert!(!outcome.success);
    assert_eq!(
        outcome.message,
        "Failed to send email via Zapier MCP: Rate limit exceeded"
    );
}

#[tokio::test]
async fn test_rpc_error_without_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32000 }
        })))
        .mount(&server)
        .await;

    let outcome = service_for(&server, None).send_email("a@b.com", "Hi", "Hello").await;
    assert_eq!(outcome.message, "Failed to send email via Zapier MCP: MCP request failed");
}

#[tokio::test]
async fn test_missing_url_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = ZapierDispatcher::new(&ZapierConfig::default()).err().unwrap();
    assert_eq!(err.to_string(), "ZAPIER_MCP_URL is not configured");
    assert!(MailService::from_config(&MailConfig::default()).is_err());
}

#[tokio::test]
async fn test_compose_sends_generated_body() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "Generated hello" }] } }]
        })))
        .mount(&gemini)
        .await;

    let zapier = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "params": { "arguments": { "body": "Generated hello" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_envelope()))
        .expect(1)
        .mount(&zapier)
        .await;

    let outcome = service_for(&zapier, Some(&gemini))
        .generate_and_send_email("a@b.com", "Hi", "say hello")
        .await;
    assert!(outcome.success);
    assert_eq!(outcome.generated_body, "Generated hello");
}

#[tokio::test]
async fn test_compose_generation_failure_skips_dispatch() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&gemini)
        .await;

    let zapier = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_envelope()))
        .expect(0)
        .mount(&zapier)
        .await;

    let service = MailService::new(
        Arc::new(GeminiGenerator::new(&GeminiConfig {
            api_key: Some("AIzaTestKey".into()),
            base_url: gemini.uri(),
            ..Default::default()
        })),
        Arc::new(
            ZapierDispatcher::new(&ZapierConfig {
                mcp_url: Some(zapier.uri()),
                ..Default::default()
            })
            .unwrap(),
        ),
    );

    let outcome = service
        .generate_and_send_email("a@b.com", "Hi", "say hello")
        .await;
    assert!(!outcome.success);
    assert_eq!(
        outcome.message,
        "Failed to generate email with Gemini: HTTP 500: internal"
    );
    assert_eq!(outcome.generated_body, "");
}
