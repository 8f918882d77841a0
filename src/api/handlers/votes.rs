//! Vote handlers: cast and withdraw.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::VoteResponse;
use crate::api::extractors::{AuthUser, ClientOrigin};
use crate::app_state::AppState;
use crate::domain::IdeaId;
use crate::error::{ApiError, ErrorResponse};

/// `POST /ideas/{id}/vote` — Vote for an approved idea.
///
/// # Errors
///
/// Returns [`ApiError`] when unauthenticated, rate-limited, the idea is
/// unknown or not `Approved`, or the store is disabled.
#[utoipa::path(
    post,
    path = "/api/ideas/{id}/vote",
    tag = "Votes",
    summary = "Cast a vote",
    description = "Idempotent: voting twice returns the unchanged count with `alreadyVoted: true`. Every success is pushed to open vote-update streams.",
    params(("id" = String, Path, description = "Idea id")),
    responses(
        (status = 200, description = "Vote recorded", body = VoteResponse),
        (status = 400, description = "Idea is not approved", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Idea not found", body = ErrorResponse),
        (status = 429, description = "Too many votes", body = ErrorResponse),
        (status = 503, description = "Database not configured", body = ErrorResponse),
    )
)]
pub async fn cast_vote(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ClientOrigin(origin): ClientOrigin,
    Path(id): Path<IdeaId>,
) -> Result<impl IntoResponse, ApiError> {
    let tally = state.vote_service.cast(&user, &origin, &id).await?;
    Ok(Json(VoteResponse::from(tally)))
}

/// `DELETE /ideas/{id}/vote` — Withdraw a vote.
///
/// # Errors
///
/// Returns [`ApiError`] when unauthenticated, rate-limited, or when no
/// vote exists.
#[utoipa::path(
    delete,
    path = "/api/ideas/{id}/vote",
    tag = "Votes",
    summary = "Remove a vote",
    params(("id" = String, Path, description = "Idea id")),
    responses(
        (status = 200, description = "Vote removed", body = VoteResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Vote not found", body = ErrorResponse),
        (status = 429, description = "Too many votes", body = ErrorResponse),
    )
)]
pub async fn remove_vote(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ClientOrigin(origin): ClientOrigin,
    Path(id): Path<IdeaId>,
) -> Result<impl IntoResponse, ApiError> {
    let tally = state.vote_service.remove(&user, &origin, &id).await?;
    Ok(Json(VoteResponse::from(tally)))
}

/// Vote routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/ideas/{id}/vote", post(cast_vote).delete(remove_vote))
}
