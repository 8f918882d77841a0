//! Vote service: idempotent cast/remove against the ledger, followed by a
//! fan-out of the new count.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::vote_broadcaster::VoteEventReceiver;
use crate::domain::vote_event::ConnectionId;
use crate::domain::{
    Identity, IdeaId, IdeaStatus, RateLimiter, Vote, VoteBroadcaster, VoteInsert, VoteTally,
};
use crate::error::ApiError;
use crate::persistence::Store;

/// A freshly opened vote-update stream.
#[derive(Debug)]
pub struct VoteSubscription {
    /// Registry key of the connection.
    pub connection_id: ConnectionId,
    /// Events for this connection, starting with `connected` and the
    /// count snapshot.
    pub receiver: VoteEventReceiver,
}

/// Orchestrates the vote ledger and the realtime fan-out.
#[derive(Debug, Clone)]
pub struct VoteService {
    store: Arc<dyn Store>,
    limiter: Arc<RateLimiter>,
    broadcaster: Arc<VoteBroadcaster>,
}

impl VoteService {
    /// Creates a new `VoteService`.
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        limiter: Arc<RateLimiter>,
        broadcaster: Arc<VoteBroadcaster>,
    ) -> Self {
        Self {
            store,
            limiter,
            broadcaster,
        }
    }

    /// Returns a reference to the inner [`VoteBroadcaster`].
    #[must_use]
    pub fn broadcaster(&self) -> &Arc<VoteBroadcaster> {
        &self.broadcaster
    }

    /// Records `voter`'s vote on an approved idea. Casting twice is a
    /// no-op reported as `already_voted`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RateLimited`], [`ApiError::NotFound`] if the
    /// idea does not exist, or [`ApiError::InvalidState`] if it is not
    /// `Approved`.
    pub async fn cast(
        &self,
        voter: &Identity,
        origin: &str,
        idea_id: &IdeaId,
    ) -> Result<VoteTally, ApiError> {
        self.limiter.check(origin)?;
        self.ensure_votable(idea_id).await?;

        let vote = Vote::new(idea_id.clone(), &voter.email, Utc::now());
        let outcome = self.store.insert_vote(&vote).await?;
        let vote_count = self.store.count_votes(idea_id).await?;
        let delivered = self.broadcaster.broadcast_vote_update(idea_id, vote_count);

        tracing::info!(
            %idea_id,
            voter = %voter.email,
            vote_count,
            ?outcome,
            delivered,
            "vote cast"
        );
        Ok(VoteTally {
            vote_count,
            already_voted: outcome == VoteInsert::Duplicate,
        })
    }

    /// Withdraws `voter`'s vote.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RateLimited`] or [`ApiError::NotFound`] if
    /// there is no such vote.
    pub async fn remove(
        &self,
        voter: &Identity,
        origin: &str,
        idea_id: &IdeaId,
    ) -> Result<VoteTally, ApiError> {
        self.limiter.check(origin)?;

        if !self.store.delete_vote(idea_id, &voter.email).await? {
            return Err(ApiError::NotFound("Vote"));
        }
        let vote_count = self.store.count_votes(idea_id).await?;
        let delivered = self.broadcaster.broadcast_vote_update(idea_id, vote_count);

        tracing::info!(%idea_id, voter = %voter.email, vote_count, delivered, "vote removed");
        Ok(VoteTally {
            vote_count,
            already_voted: false,
        })
    }

    /// Current number of votes on an idea.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn count_for(&self, idea_id: &IdeaId) -> Result<i64, ApiError> {
        self.store.count_votes(idea_id).await
    }

    /// Ids of the ideas `voter` has voted on, newest vote first.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn votes_by_voter(&self, voter: &Identity) -> Result<Vec<IdeaId>, ApiError> {
        self.store.votes_by_voter(&voter.email).await
    }

    /// Opens a vote-update stream with the current counts of every
    /// approved idea queued as its first snapshot. With the store disabled
    /// the snapshot is empty.
    ///
    /// Counts are read before the connection is registered. A vote that
    /// lands between the read and the registration reaches this client
    /// with the next update for that idea.
    pub async fn subscribe(&self, last_event_id: u64) -> VoteSubscription {
        let counts = match self.store.approved_vote_counts().await {
            Ok(counts) => counts,
            Err(err) => {
                tracing::warn!(error = %err, "vote snapshot unavailable");
                Vec::new()
            }
        };
        let (connection_id, receiver) = self.broadcaster.subscribe(last_event_id, counts);
        VoteSubscription {
            connection_id,
            receiver,
        }
    }

    /// Closes a vote-update stream.
    pub fn unsubscribe(&self, connection_id: &str) {
        self.broadcaster.unsubscribe(connection_id);
    }

    async fn ensure_votable(&self, idea_id: &IdeaId) -> Result<(), ApiError> {
        let item = self
            .store
            .find_idea(idea_id)
            .await?
            .ok_or(ApiError::NotFound("Idea"))?;
        if item.idea.status != IdeaStatus::Approved {
            return Err(ApiError::InvalidState(
                "Can only vote on approved ideas".to_string(),
            ));
        }
        Ok(())
    }
}
