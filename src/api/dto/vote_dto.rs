//! Vote DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{IdeaId, VoteTally};

/// Response body for `POST|DELETE /ideas/{id}/vote`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    /// Always `true`.
    pub ok: bool,
    /// Vote count after the operation.
    pub vote_count: i64,
    /// `true` when the vote already existed.
    pub already_voted: bool,
}

impl From<VoteTally> for VoteResponse {
    fn from(tally: VoteTally) -> Self {
        Self {
            ok: true,
            vote_count: tally.vote_count,
            already_voted: tally.already_voted,
        }
    }
}

/// Response body for `GET /user/votes`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserVotesResponse {
    /// Ideas the caller has voted on.
    pub votes: Vec<IdeaId>,
}

/// Query parameters for `GET /ideas/vote-updates`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct VoteUpdatesParams {
    /// Last event id the client saw. Recorded only; the stream always
    /// starts with a full snapshot.
    #[serde(default)]
    pub last_event_id: Option<String>,
}

impl VoteUpdatesParams {
    /// Parsed `lastEventId`, 0 when absent or not a number.
    #[must_use]
    pub fn last_event_id(&self) -> u64 {
        self.last_event_id
            .as_deref()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }
}
