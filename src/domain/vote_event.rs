//! Events pushed to live vote-count subscribers.
//!
//! Every ledger mutation produces a [`VoteEvent::VoteUpdate`] through the
//! [`super::VoteBroadcaster`]; a new subscriber first receives
//! [`VoteEvent::Connected`] and a full [`VoteEvent::VoteCounts`] snapshot.

use std::collections::BTreeMap;

use serde::Serialize;

use super::IdeaId;

/// Process-local connection identifier.
pub type ConnectionId = String;

/// Event delivered over the vote-updates stream.
///
/// Serialized as `{"type": "vote_update", "ideaId": ..., ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum VoteEvent {
    /// Acknowledges a new subscription.
    Connected {
        /// Id assigned to this connection.
        connection_id: ConnectionId,
    },
    /// Full snapshot of counts for every approved idea.
    VoteCounts {
        /// Vote count keyed by idea id.
        vote_counts: BTreeMap<IdeaId, i64>,
        /// Monotonic event id.
        event_id: u64,
    },
    /// Count change for a single idea.
    VoteUpdate {
        /// Idea whose count changed.
        idea_id: IdeaId,
        /// New count.
        vote_count: i64,
        /// Monotonic event id.
        event_id: u64,
    },
}

impl VoteEvent {
    /// Returns the event id, if the event carries one.
    #[must_use]
    pub const fn event_id(&self) -> Option<u64> {
        match self {
            Self::Connected { .. } => None,
            Self::VoteCounts { event_id, .. } | Self::VoteUpdate { event_id, .. } => {
                Some(*event_id)
            }
        }
    }
}
