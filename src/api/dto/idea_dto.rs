//! Idea DTOs: listing, submission, and moderation.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Idea;
use crate::persistence::IdeaWithVotes;

/// Query parameters for `GET /ideas`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListIdeasParams {
    /// Only ideas with this status. Unknown names match nothing.
    #[serde(default)]
    pub status: Option<String>,
    /// `created` (default), `votes`, or `updated`.
    #[serde(default)]
    pub sort: Option<String>,
}

/// Response body for `GET /ideas`.
#[derive(Debug, Serialize, ToSchema)]
pub struct IdeaListResponse {
    /// Visible ideas with vote counts.
    pub ideas: Vec<IdeaWithVotes>,
}

/// Response body for `GET /ideas/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct IdeaResponse {
    /// The idea with its vote count.
    pub idea: IdeaWithVotes,
}

/// Request body for `POST /ideas`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitIdeaRequest {
    /// 3–200 characters after sanitizing.
    #[serde(default)]
    pub title: String,
    /// 10–2000 characters after sanitizing.
    #[serde(default)]
    pub description: String,
    /// Defaults to `General`.
    #[serde(default)]
    pub category: Option<String>,
}

/// Response body for submission and moderation endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct IdeaMutationResponse {
    /// Always `true`.
    pub ok: bool,
    /// The idea after the operation.
    pub idea: Idea,
}

impl From<Idea> for IdeaMutationResponse {
    fn from(idea: Idea) -> Self {
        Self { ok: true, idea }
    }
}

/// Request body for `PUT /ideas/{id}/schedule`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    /// RFC 3339 instant (or `YYYY-MM-DD`).
    #[serde(default)]
    pub scheduled_date: Option<String>,
    /// Optional stream link; empty clears it.
    #[serde(default)]
    pub youtube_link: Option<String>,
}

/// Request body for `POST|PUT /ideas/{id}/status`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SetStatusRequest {
    /// Any of the seven status names.
    #[serde(default)]
    pub status: Option<String>,
}
