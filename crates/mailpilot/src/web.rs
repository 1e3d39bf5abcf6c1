//! HTTP API for MailPilot.
//!
//! Thin JSON routes over [`MailService`]. Outcomes are returned as-is; the
//! status code only mirrors `success`.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::service::MailService;

/// Shared state for web handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MailService>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(service: Arc<MailService>) -> Self {
        Self {
            service,
            start_time: Instant::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct SendBody {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ComposeBody {
    pub to: String,
    pub subject: String,
    pub prompt: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate-ai-email", post(generate_ai_email))
        .route("/api/send-email", post(send_email))
        .route("/api/send-ai-email", post(send_ai_email))
        .route("/health", get(handle_health))
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-dns-prefetch-control"),
            HeaderValue::from_static("on"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=63072000; includeSubDomains; preload"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn outcome_response<T: Serialize>(success: bool, outcome: T) -> Response {
    let status = if success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(outcome)).into_response()
}

async fn generate_ai_email(State(state): State<AppState>, Json(req): Json<GenerateBody>) -> Response {
    let outcome = state.service.generate_email_body(&req.prompt).await;
    outcome_response(outcome.success, outcome)
}

async fn send_email(State(state): State<AppState>, Json(req): Json<SendBody>) -> Response {
    let outcome = state.service.send_email(&req.to, &req.subject, &req.body).await;
    outcome_response(outcome.success, outcome)
}

async fn send_ai_email(State(state): State<AppState>, Json(req): Json<ComposeBody>) -> Response {
    let outcome = state
        .service
        .generate_and_send_email(&req.to, &req.subject, &req.prompt)
        .await;
    outcome_response(outcome.success, outcome)
}

/// Health check endpoint
pub async fn handle_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "generator": state.service.generator_configured(),
        "dispatcher": state.service.dispatcher_configured(),
    }))
}
