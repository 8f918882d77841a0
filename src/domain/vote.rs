//! Votes and the results of ledger mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::IdeaId;

/// One voter's endorsement of one idea. Unique per `(idea_id, voter_email)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    /// Opaque row id (`vote-<uuid>`).
    pub id: String,
    /// Idea being endorsed.
    pub idea_id: IdeaId,
    /// Lower-cased voter email.
    pub voter_email: String,
    /// Insertion instant.
    pub created_at: DateTime<Utc>,
}

impl Vote {
    /// Creates a new vote record with a fresh id.
    #[must_use]
    pub fn new(idea_id: IdeaId, voter_email: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("vote-{}", uuid::Uuid::new_v4().simple()),
            idea_id,
            voter_email: voter_email.to_string(),
            created_at: now,
        }
    }
}

/// What the store did with an insert request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteInsert {
    /// A new row was written.
    Inserted,
    /// A row for the same `(idea, voter)` already existed.
    Duplicate,
}

/// Result of a cast or remove operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTally {
    /// Number of votes on the idea after the operation.
    pub vote_count: i64,
    /// `true` when a cast found an existing vote and changed nothing.
    pub already_voted: bool,
}
