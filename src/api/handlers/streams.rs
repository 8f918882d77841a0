//! Stream calendar handlers.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{
    BulkStatusRequest, BulkStatusResponse, ListStreamsParams, StreamListResponse, StreamResponse,
    UpdateStreamRequest,
};
use crate::api::extractors::AdminUser;
use crate::app_state::AppState;
use crate::domain::IdeaId;
use crate::error::{ApiError, ErrorResponse};

/// `GET /streams` — The stream calendar.
///
/// # Errors
///
/// Returns [`ApiError`] on store failures other than a disabled store.
#[utoipa::path(
    get,
    path = "/api/streams",
    tag = "Streams",
    summary = "List streams",
    description = "Scheduled and Live streams by air date, then Completed streams newest first.",
    params(ListStreamsParams),
    responses(
        (status = 200, description = "Stream calendar", body = StreamListResponse),
    )
)]
pub async fn list_streams(
    State(state): State<AppState>,
    Query(params): Query<ListStreamsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let streams = state.idea_service.list_streams(params.status()).await?;
    Ok(Json(StreamListResponse { streams }))
}

/// `PUT /streams/{id}` — Reschedule, relink, or re-status a stream.
///
/// # Errors
///
/// Returns [`ApiError`] for non-admins, invalid fields, or unknown ids.
#[utoipa::path(
    put,
    path = "/api/streams/{id}",
    tag = "Streams",
    summary = "Update a stream",
    description = "Free-form admin patch. Absent fields are untouched; null or empty clears the date or link.",
    params(("id" = String, Path, description = "Idea id")),
    request_body = UpdateStreamRequest,
    responses(
        (status = 200, description = "Stream updated", body = StreamResponse),
        (status = 400, description = "Invalid date or status", body = ErrorResponse),
        (status = 401, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Stream not found", body = ErrorResponse),
    )
)]
pub async fn update_stream(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<IdeaId>,
    Json(req): Json<UpdateStreamRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let patch = req.into_patch()?;
    let stream = state
        .idea_service
        .update_stream(&admin, &id, &patch)
        .await?;
    Ok(Json(StreamResponse { ok: true, stream }))
}

/// `POST /streams/bulk` — Move many streams to one status.
///
/// # Errors
///
/// Returns [`ApiError`] for non-admins, an empty id list, or an invalid
/// target status.
#[utoipa::path(
    post,
    path = "/api/streams/bulk",
    tag = "Streams",
    summary = "Bulk stream status",
    description = "Sets Live, Completed, or Cancelled on every listed idea that is currently Scheduled, Live, or Completed. Other ids are skipped.",
    request_body = BulkStatusRequest,
    responses(
        (status = 200, description = "Streams updated", body = BulkStatusResponse),
        (status = 400, description = "Missing ids or invalid status", body = ErrorResponse),
        (status = 401, description = "Admin access required", body = ErrorResponse),
    )
)]
pub async fn bulk_update_streams(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(req): Json<BulkStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let streams = state
        .idea_service
        .bulk_set_status(&admin, &req.stream_ids, req.status.as_deref())
        .await?;
    Ok(Json(BulkStatusResponse {
        ok: true,
        updated: streams.len(),
        streams,
    }))
}

/// Stream routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/streams", get(list_streams))
        .route("/streams/bulk", post(bulk_update_streams))
        .route("/streams/{id}", put(update_stream))
}
