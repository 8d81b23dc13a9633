//! Relay router, handlers, and server bootstrap.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;

use fable_ai::{ChatMessage, GeminiClient, GeminiConfig, UpstreamClient};
use fable_core::RelayConfig;
use fable_dialogue::{run_chat, run_summarize};

use crate::cors::build_cors_layer;
use crate::endpoints::{CHAT_ENDPOINT, HEALTH_ENDPOINT, SUMMARIZE_ENDPOINT};
use crate::types::{parse_json_body, ChatRequestBody, RelayApiError, SummarizeRequestBody};

const UPSTREAM_REQUEST_TIMEOUT_MS: u64 = 60_000;

/// Shared handler state: the upstream client behind the reliability layer.
pub struct RelayServerState {
    upstream: Arc<dyn UpstreamClient>,
}

impl RelayServerState {
    pub fn new(upstream: Arc<dyn UpstreamClient>) -> Self {
        Self { upstream }
    }
}

pub fn build_relay_router(state: Arc<RelayServerState>) -> Router {
    Router::new()
        .route(CHAT_ENDPOINT, post(handle_chat))
        .route(SUMMARIZE_ENDPOINT, post(handle_summarize))
        .route(HEALTH_ENDPOINT, get(handle_health))
        .layer(build_cors_layer())
        .with_state(state)
}

/// Binds the configured port and serves the relay until ctrl-c.
pub async fn run_relay_server(config: RelayConfig) -> Result<()> {
    let upstream = GeminiClient::new(GeminiConfig {
        api_base: config.api_base.clone(),
        api_key: config.api_key.clone(),
        model: config.model.clone(),
        request_timeout_ms: UPSTREAM_REQUEST_TIMEOUT_MS,
    })
    .context("failed to construct the Gemini client")?;

    let bind_addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind relay server on {bind_addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve bound relay server address")?;

    tracing::info!(addr = %local_addr, model = %config.model, "relay server listening");

    let state = Arc::new(RelayServerState::new(Arc::new(upstream)));
    let app = build_relay_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("relay server exited unexpectedly")
}

async fn handle_chat(State(state): State<Arc<RelayServerState>>, body: Bytes) -> Response {
    let request = match parse_json_body::<ChatRequestBody>(&body) {
        Ok(request) => request,
        Err(error) => return error.into_response(),
    };

    let messages: Vec<ChatMessage> = match request.messages {
        Some(messages) if !messages.is_empty() => messages,
        _ => {
            return RelayApiError::bad_request(
                "invalid_request",
                "request body must include a non-empty \"messages\" array",
            )
            .into_response()
        }
    };

    match run_chat(state.upstream.as_ref(), messages).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(error) => {
            tracing::error!(%error, "chat relay failed");
            RelayApiError::from_relay(error).into_response()
        }
    }
}

async fn handle_summarize(State(state): State<Arc<RelayServerState>>, body: Bytes) -> Response {
    let request = match parse_json_body::<SummarizeRequestBody>(&body) {
        Ok(request) => request,
        Err(error) => return error.into_response(),
    };

    let Some(messages) = request.messages else {
        return RelayApiError::bad_request(
            "invalid_request",
            "request body must include a \"messages\" array",
        )
        .into_response();
    };

    let existing_summary = request.existing_summary.as_deref();
    match run_summarize(state.upstream.as_ref(), &messages, existing_summary).await {
        Ok(summary) => (StatusCode::OK, Json(ChatMessage::assistant(summary))).into_response(),
        Err(error) => {
            tracing::error!(%error, "summarize relay failed");
            RelayApiError::from_relay(error).into_response()
        }
    }
}

async fn handle_health() -> Response {
    (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
}
