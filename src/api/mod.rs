//! HTTP API for running agent turns.

pub mod types;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::agent::Agent;
use crate::config::Config;
use crate::error::AgentError;
use types::{ErrorResponse, HealthResponse, InvokeRequest, InvokeResponse};

/// Shared state of the HTTP handlers.
pub struct AppState {
    pub agent: Agent,
}

/// Build the router over an existing agent.
pub fn router(agent: Agent) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/invoke", post(invoke))
        .with_state(Arc::new(AppState { agent }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let agent = Agent::from_config(&config)?;
    let addr = format!("{}:{}", config.host, config.port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, router(agent)).await?;

    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn invoke(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InvokeRequest>,
) -> Response {
    let overrides = req.configurable.clone();
    let messages = req.into_messages();
    if messages.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Request must contain `message` or `messages`".to_string(),
        );
    }

    match state.agent.invoke(messages, &overrides).await {
        Ok(final_state) => Json(InvokeResponse::from(final_state)).into_response(),
        Err(e) => {
            tracing::error!("Agent turn failed: {}", e);
            error_response(status_for(&e), e.to_string())
        }
    }
}

fn status_for(error: &AgentError) -> StatusCode {
    match error {
        AgentError::Configuration(_) | AgentError::InvariantViolation { .. } => {
            StatusCode::BAD_REQUEST
        }
        AgentError::ModelInvocation(_) => StatusCode::BAD_GATEWAY,
        // Tool errors become tool-result messages inside the turn; reaching
        // here means one escaped.
        AgentError::UnknownTool(_)
        | AgentError::InvalidArguments { .. }
        | AgentError::ToolFailed { .. }
        | AgentError::SearchBackend(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}
