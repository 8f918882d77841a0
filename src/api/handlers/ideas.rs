//! Idea handlers: list, submit, get, and the moderation workflow.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{
    IdeaListResponse, IdeaMutationResponse, IdeaResponse, ListIdeasParams, ScheduleRequest,
    SetStatusRequest, SubmitIdeaRequest,
};
use crate::api::extractors::{AdminUser, AuthUser, Caller, ClientOrigin};
use crate::app_state::AppState;
use crate::domain::{IdeaId, IdeaStatus};
use crate::error::{ApiError, ErrorResponse};
use crate::persistence::IdeaSort;

/// `GET /ideas` — List ideas visible to the caller.
///
/// # Errors
///
/// Returns [`ApiError`] on store failures other than a disabled store.
#[utoipa::path(
    get,
    path = "/api/ideas",
    tag = "Ideas",
    summary = "List ideas",
    description = "Admins see every idea, signed-in users see approved ideas plus their own, anonymous callers see approved ideas only. Returns an empty list while the database is not configured.",
    params(ListIdeasParams),
    responses(
        (status = 200, description = "Ideas with vote counts", body = IdeaListResponse),
    )
)]
pub async fn list_ideas(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(params): Query<ListIdeasParams>,
) -> Result<impl IntoResponse, ApiError> {
    let status = match params.status.as_deref() {
        None | Some("") => None,
        Some(raw) => match raw.parse::<IdeaStatus>() {
            Ok(status) => Some(status),
            Err(_) => return Ok(Json(IdeaListResponse { ideas: Vec::new() })),
        },
    };
    let sort = IdeaSort::from_param(params.sort.as_deref());
    let ideas = state
        .idea_service
        .list(caller.as_ref(), status, sort)
        .await?;
    Ok(Json(IdeaListResponse { ideas }))
}

/// `POST /ideas` — Submit a new idea.
///
/// # Errors
///
/// Returns [`ApiError`] when unauthenticated, rate-limited, invalid, or
/// when the store is disabled.
#[utoipa::path(
    post,
    path = "/api/ideas",
    tag = "Ideas",
    summary = "Submit an idea",
    description = "Creates a Pending idea. Title and description are trimmed and stripped of angle brackets before validation. Rate-limited per client.",
    request_body = SubmitIdeaRequest,
    responses(
        (status = 201, description = "Idea created", body = IdeaMutationResponse),
        (status = 400, description = "Invalid title or description", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 429, description = "Too many submissions", body = ErrorResponse),
        (status = 503, description = "Database not configured", body = ErrorResponse),
    )
)]
pub async fn submit_idea(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ClientOrigin(origin): ClientOrigin,
    Json(req): Json<SubmitIdeaRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let idea = state
        .idea_service
        .submit(
            &user,
            &origin,
            &req.title,
            &req.description,
            req.category.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(IdeaMutationResponse::from(idea))))
}

/// `GET /ideas/{id}` — Get one idea.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] if the idea is unknown or hidden.
#[utoipa::path(
    get,
    path = "/api/ideas/{id}",
    tag = "Ideas",
    summary = "Get an idea",
    params(("id" = String, Path, description = "Idea id")),
    responses(
        (status = 200, description = "The idea", body = IdeaResponse),
        (status = 404, description = "Idea not found", body = ErrorResponse),
    )
)]
pub async fn get_idea(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<IdeaId>,
) -> Result<impl IntoResponse, ApiError> {
    let idea = state.idea_service.get(caller.as_ref(), &id).await?;
    Ok(Json(IdeaResponse { idea }))
}

/// `POST|PUT /ideas/{id}/approve` — Approve a pending idea.
///
/// # Errors
///
/// Returns [`ApiError`] for non-admins, unknown ideas, or ideas that are
/// not `Pending`.
#[utoipa::path(
    put,
    path = "/api/ideas/{id}/approve",
    tag = "Moderation",
    summary = "Approve an idea",
    description = "Pending → Approved. Also accepted as POST.",
    params(("id" = String, Path, description = "Idea id")),
    responses(
        (status = 200, description = "Idea approved", body = IdeaMutationResponse),
        (status = 400, description = "Idea is not pending", body = ErrorResponse),
        (status = 401, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Idea not found", body = ErrorResponse),
    )
)]
pub async fn approve_idea(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<IdeaId>,
) -> Result<impl IntoResponse, ApiError> {
    let idea = state.idea_service.approve(&admin, &id).await?;
    Ok(Json(IdeaMutationResponse::from(idea)))
}

/// `PUT /ideas/{id}/schedule` — Schedule an approved idea.
///
/// # Errors
///
/// Returns [`ApiError`] for non-admins, bad dates, unknown ideas, or
/// ideas that are not `Approved`.
#[utoipa::path(
    put,
    path = "/api/ideas/{id}/schedule",
    tag = "Moderation",
    summary = "Schedule an idea",
    description = "Approved → Scheduled with an air date and optional stream link.",
    params(("id" = String, Path, description = "Idea id")),
    request_body = ScheduleRequest,
    responses(
        (status = 200, description = "Idea scheduled", body = IdeaMutationResponse),
        (status = 400, description = "Missing or invalid date, or idea not approved", body = ErrorResponse),
        (status = 401, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Idea not found", body = ErrorResponse),
    )
)]
pub async fn schedule_idea(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<IdeaId>,
    Json(req): Json<ScheduleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let idea = state
        .idea_service
        .schedule(
            &admin,
            &id,
            req.scheduled_date.as_deref(),
            req.youtube_link.as_deref(),
        )
        .await?;
    Ok(Json(IdeaMutationResponse::from(idea)))
}

/// `POST|PUT /ideas/{id}/status` — Force any status.
///
/// # Errors
///
/// Returns [`ApiError`] for non-admins, unknown statuses, or unknown
/// ideas.
#[utoipa::path(
    put,
    path = "/api/ideas/{id}/status",
    tag = "Moderation",
    summary = "Set an idea's status",
    description = "Admin correction path: sets any of the seven statuses without checking the current one. Also accepted as POST.",
    params(("id" = String, Path, description = "Idea id")),
    request_body = SetStatusRequest,
    responses(
        (status = 200, description = "Status set", body = IdeaMutationResponse),
        (status = 400, description = "Invalid status", body = ErrorResponse),
        (status = 401, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Idea not found", body = ErrorResponse),
    )
)]
pub async fn set_idea_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<IdeaId>,
    Json(req): Json<SetStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let idea = state
        .idea_service
        .set_status(&admin, &id, req.status.as_deref())
        .await?;
    Ok(Json(IdeaMutationResponse::from(idea)))
}

/// Idea routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ideas", get(list_ideas).post(submit_idea))
        .route("/ideas/{id}", get(get_idea))
        .route("/ideas/{id}/approve", post(approve_idea).put(approve_idea))
        .route("/ideas/{id}/schedule", put(schedule_idea))
        .route(
            "/ideas/{id}/status",
            post(set_idea_status).put(set_idea_status),
        )
}
