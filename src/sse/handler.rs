//! Axum handler for the vote-updates stream.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::sse::Sse;

use super::stream::VoteStream;
use crate::api::dto::VoteUpdatesParams;
use crate::app_state::AppState;

/// `GET /ideas/vote-updates` — Live vote counts over Server-Sent Events.
///
/// Emits `connected`, then a `vote_counts` snapshot of every approved
/// idea, then one `vote_update` per ledger change.
#[utoipa::path(
    get,
    path = "/api/ideas/vote-updates",
    tag = "Votes",
    summary = "Stream vote counts",
    description = "Server-Sent Events. Each frame's data is a JSON object with a `type` of `connected`, `vote_counts`, or `vote_update`. `lastEventId` is recorded but a full snapshot is always sent.",
    params(VoteUpdatesParams),
    responses(
        (status = 200, description = "Event stream", body = String, content_type = "text/event-stream"),
    )
)]
pub async fn vote_updates(
    State(state): State<AppState>,
    Query(params): Query<VoteUpdatesParams>,
) -> Sse<VoteStream> {
    let service = Arc::clone(&state.vote_service);
    let subscription = service.subscribe(params.last_event_id()).await;
    tracing::debug!(
        connection_id = %subscription.connection_id,
        last_event_id = params.last_event_id(),
        "vote stream opened"
    );
    Sse::new(VoteStream::new(subscription, service))
}
