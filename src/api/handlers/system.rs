//! System endpoints: health check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::config::StoreBackend;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `healthy` when the process answers.
    pub status: String,
    /// Server time, RFC 3339.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
    /// `postgres`, `memory`, or `disabled`.
    pub store: String,
    /// Open vote-update streams.
    pub vote_streams: usize,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, active store, and the number of open vote streams.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let store = match state.config.store_backend {
        StoreBackend::Memory => "memory",
        StoreBackend::Postgres if state.config.database_url.is_some() => "postgres",
        StoreBackend::Postgres => "disabled",
    };
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store: store.to_string(),
            vote_streams: state.vote_service.broadcaster().connection_count(),
        }),
    )
}

/// System routes mounted at the root level (not under `/api`).
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
