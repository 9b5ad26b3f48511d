use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use offboard_pipeline::{DeactivationPipeline, IncomingEvent};
use serde_json::Value;
use tokio::net::TcpListener;

mod types;

use types::{HealthResponse, WebhookApiError, WebhookResponse};

pub const WEBHOOK_ENDPOINT: &str = "/webhook";
pub const HEALTH_ENDPOINT: &str = "/health";
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
/// Public struct `WebhookServerConfig` used to start the webhook listener.
pub struct WebhookServerConfig {
    pub bind: String,
    pub max_body_bytes: usize,
    pub pipeline: Arc<DeactivationPipeline>,
}

#[derive(Clone)]
struct WebhookServerState {
    config: WebhookServerConfig,
}

impl WebhookServerState {
    fn new(config: WebhookServerConfig) -> Self {
        Self { config }
    }
}

pub async fn run_webhook_server(config: WebhookServerConfig) -> Result<()> {
    let bind_addr = config
        .bind
        .parse::<SocketAddr>()
        .with_context(|| format!("invalid --bind '{}'", config.bind))?;

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind webhook server on {bind_addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve bound webhook server address")?;

    tracing::info!(
        endpoint = WEBHOOK_ENDPOINT,
        addr = %local_addr,
        llm_configured = config.pipeline.llm_configured(),
        "webhook server listening"
    );

    let state = Arc::new(WebhookServerState::new(config));
    let app = build_webhook_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("webhook server exited unexpectedly")?;

    tracing::info!("webhook server stopped");
    Ok(())
}

fn build_webhook_router(state: Arc<WebhookServerState>) -> Router {
    let max_body_bytes = state.config.max_body_bytes.max(1);
    Router::new()
        .route(WEBHOOK_ENDPOINT, post(handle_webhook))
        .route(HEALTH_ENDPOINT, get(handle_health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

async fn handle_health(State(state): State<Arc<WebhookServerState>>) -> Response {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "success",
            llm_configured: state.config.pipeline.llm_configured(),
        }),
    )
        .into_response()
}

async fn handle_webhook(State(state): State<Arc<WebhookServerState>>, body: Bytes) -> Response {
    let payload = match parse_webhook_json_body(&body) {
        Ok(payload) => payload,
        Err(error) => return error.into_response(),
    };
    let event = match IncomingEvent::from_payload(&payload) {
        Ok(event) => event,
        Err(error) => {
            tracing::warn!(error = %error, "rejected webhook payload");
            return WebhookApiError::bad_request("invalid_payload", error.to_string())
                .into_response();
        }
    };

    // The pipeline runs on its own task so a dropped connection does not
    // abandon a half-reported ticket.
    let pipeline = Arc::clone(&state.config.pipeline);
    let issue_key = event.issue_key.clone();
    let outcome = tokio::spawn(async move { pipeline.handle(&event).await }).await;
    match outcome {
        Ok(outcome) => (
            StatusCode::OK,
            Json(WebhookResponse {
                status: outcome.status.as_str(),
            }),
        )
            .into_response(),
        Err(error) => {
            tracing::error!(
                issue_key = issue_key.as_str(),
                error = %error,
                "webhook pipeline task failed"
            );
            WebhookApiError::internal(format!("webhook pipeline failed: {error}")).into_response()
        }
    }
}

fn parse_webhook_json_body(body: &Bytes) -> Result<Value, WebhookApiError> {
    serde_json::from_slice::<Value>(body).map_err(|error| {
        WebhookApiError::bad_request(
            "malformed_json",
            format!("failed to parse request body: {error}"),
        )
    })
}
