//! Self-service handlers for the signed-in user.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{ProfileResponse, UpdateProfileRequest, UserVotesResponse};
use crate::api::extractors::AuthUser;
use crate::app_state::AppState;
use crate::domain::ProfileUpdate;
use crate::error::{ApiError, ErrorResponse};

/// `GET /user/profile` — The caller's profile.
///
/// # Errors
///
/// Returns [`ApiError`] when unauthenticated or on store failure.
#[utoipa::path(
    get,
    path = "/api/user/profile",
    tag = "User",
    summary = "Get own profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.user_service.profile(&user).await?;
    Ok(Json(ProfileResponse { profile }))
}

/// `PUT /user/profile` — Edit the caller's profile.
///
/// # Errors
///
/// Returns [`ApiError`] when unauthenticated, for over-long fields, or
/// on store failure.
#[utoipa::path(
    put,
    path = "/api/user/profile",
    tag = "User",
    summary = "Update own profile",
    description = "Sets first name, last name, and bio; the display name becomes \"first last\". Empty values clear a field.",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Field too long", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = ProfileUpdate::new(req.first_name, req.last_name, req.bio)?;
    let profile = state.user_service.update_profile(&user, &update).await?;
    Ok(Json(ProfileResponse { profile }))
}

/// `GET /user/votes` — Ideas the caller voted on.
///
/// # Errors
///
/// Returns [`ApiError`] when unauthenticated or on store failure.
#[utoipa::path(
    get,
    path = "/api/user/votes",
    tag = "User",
    summary = "List own votes",
    responses(
        (status = 200, description = "Idea ids", body = UserVotesResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
    )
)]
pub async fn user_votes(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let votes = state.vote_service.votes_by_voter(&user).await?;
    Ok(Json(UserVotesResponse { votes }))
}

/// User routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/profile", get(get_profile).put(update_profile))
        .route("/user/votes", get(user_votes))
}
