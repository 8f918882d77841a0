//! OpenAPI document for every REST endpoint.

use utoipa::OpenApi;

use crate::api::dto;
use crate::api::handlers::{auth, ideas, streams, system, user, votes};
use crate::domain::{Idea, IdeaId, IdeaStatus, Identity, UserProfile};
use crate::error::{ErrorBody, ErrorResponse};
use crate::persistence::{IdeaWithVotes, StreamSummary};
use crate::sse;

/// Generated OpenAPI specification, served at `/api-docs/openapi.json`
/// when the `swagger-ui` feature is enabled.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Stream Ideas API",
        description = "Submit, moderate, and vote on live-stream ideas."
    ),
    paths(
        ideas::list_ideas,
        ideas::submit_idea,
        ideas::get_idea,
        ideas::approve_idea,
        ideas::schedule_idea,
        ideas::set_idea_status,
        votes::cast_vote,
        votes::remove_vote,
        sse::handler::vote_updates,
        streams::list_streams,
        streams::update_stream,
        streams::bulk_update_streams,
        user::get_profile,
        user::update_profile,
        user::user_votes,
        auth::me,
        auth::login,
        auth::logout,
        system::health_handler,
    ),
    components(schemas(
        Idea,
        IdeaId,
        IdeaStatus,
        IdeaWithVotes,
        StreamSummary,
        Identity,
        UserProfile,
        ErrorResponse,
        ErrorBody,
        dto::IdeaListResponse,
        dto::IdeaResponse,
        dto::SubmitIdeaRequest,
        dto::IdeaMutationResponse,
        dto::ScheduleRequest,
        dto::SetStatusRequest,
        dto::VoteResponse,
        dto::UserVotesResponse,
        dto::StreamListResponse,
        dto::UpdateStreamRequest,
        dto::StreamResponse,
        dto::BulkStatusRequest,
        dto::BulkStatusResponse,
        dto::MeResponse,
        dto::LoginRequest,
        dto::LogoutResponse,
        dto::ProfileResponse,
        dto::UpdateProfileRequest,
        system::HealthResponse,
    )),
    tags(
        (name = "Ideas", description = "Submission and browsing"),
        (name = "Moderation", description = "Admin lifecycle transitions"),
        (name = "Votes", description = "Vote ledger and live counts"),
        (name = "Streams", description = "Stream calendar and bulk updates"),
        (name = "User", description = "Own profile and votes"),
        (name = "Auth", description = "Session cookie"),
        (name = "System", description = "Health"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_resource_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/ideas",
            "/api/ideas/{id}/vote",
            "/api/ideas/vote-updates",
            "/api/streams/bulk",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
