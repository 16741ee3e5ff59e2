//! HTTP Endpoints
//!
//! REST API for the concierge.

use std::time::Duration;

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use concierge_agent::{AgentError, DialogState};
use concierge_core::Booking;

use crate::state::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        // Session endpoints
        .route("/api/sessions", post(start_session).get(list_sessions))
        .route(
            "/api/sessions/:id",
            get(get_session).delete(delete_session),
        )
        // Chat endpoint: one caller utterance per request
        .route("/api/chat/:session_id", post(chat))
        // Health checks
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    let router = if state.config.server.cors_enabled {
        router.layer(build_cors(&state.config.server.cors_origins))
    } else {
        router
    };

    router.with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start session request
#[derive(Debug, Default, Deserialize)]
struct StartSessionRequest {
    /// Caller-supplied session key; generated when absent
    #[serde(default)]
    session_id: Option<String>,
}

/// Start session response
#[derive(Debug, Serialize)]
struct StartSessionResponse {
    session_id: String,
    greeting: String,
    dialog_state: DialogState,
}

/// Start (or fresh-start reset) a session
async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> Result<Json<StartSessionResponse>, StatusCode> {
    let max_sessions = state.config.session.max_sessions;
    if state.store.count() >= max_sessions {
        // Try to free capacity before rejecting
        state
            .store
            .cleanup_expired(Duration::from_secs(state.config.session.timeout_seconds));
        if state.store.count() >= max_sessions {
            tracing::warn!("max sessions reached");
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
    }

    let session_id = request
        .session_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let greeting = state.manager.start_session(&session_id);

    Ok(Json(StartSessionResponse {
        session_id,
        greeting,
        dialog_state: DialogState::WaitingName,
    }))
}

/// Chat request
#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

/// Chat response
#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    dialog_state: DialogState,
    #[serde(skip_serializing_if = "Option::is_none")]
    booking: Option<Booking>,
}

/// Process one caller utterance
async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, StatusCode> {
    let turn_timeout = Duration::from_secs(state.config.server.turn_timeout_seconds);

    match tokio::time::timeout(
        turn_timeout,
        state.manager.handle_turn(&session_id, &request.message),
    )
    .await
    {
        Ok(Ok(outcome)) => Ok(Json(ChatResponse {
            response: outcome.response,
            dialog_state: outcome.dialog_state,
            booking: outcome.booking,
        })),
        Ok(Err(AgentError::SessionNotFound(id))) => {
            tracing::info!(session_id = %id, "turn against unknown session");
            Err(StatusCode::NOT_FOUND)
        }
        Err(_) => {
            tracing::error!(session_id, "turn timed out");
            Err(StatusCode::GATEWAY_TIMEOUT)
        }
    }
}

/// Get session info
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let handle = state.store.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let ctx = handle.context.lock().await;

    Ok(Json(serde_json::json!({
        "session_id": handle.id,
        "dialog_state": ctx.dialog_state,
        "customer_name": ctx.customer_name,
        "pnr": ctx.pnr,
        "completed_services": ctx.completed_services.len(),
        "total_due": ctx.total_due(),
        "transfer_pending": ctx.transfer_pending(),
    })))
}

/// Delete session
async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    state.store.remove(&id);
    StatusCode::NO_CONTENT
}

/// List sessions
async fn list_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.store.list();
    Json(serde_json::json!({
        "sessions": sessions,
        "count": sessions.len(),
    }))
}

/// Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness check
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ready",
        "sessions": state.store.count(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_config::Settings;

    #[test]
    fn test_router_creation() {
        let state = AppState::new(Settings::default());
        let _ = create_router(state);
    }
}
