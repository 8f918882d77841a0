//! Store used when no database is configured.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    IdeaQuery, IdeaRepository, IdeaWithVotes, StreamSummary, UserRepository, VoteLedger,
};
use crate::domain::{
    BulkTarget, Idea, IdeaId, IdeaStatus, ProfileUpdate, UserProfile, Vote, VoteInsert,
};
use crate::error::ApiError;

/// Every operation fails with [`ApiError::ServiceUnavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStore;

#[async_trait]
impl IdeaRepository for UnavailableStore {
    async fn insert_idea(&self, _idea: &Idea) -> Result<(), ApiError> {
        Err(ApiError::store_disabled())
    }

    async fn find_idea(&self, _id: &IdeaId) -> Result<Option<IdeaWithVotes>, ApiError> {
        Err(ApiError::store_disabled())
    }

    async fn list_ideas(&self, _query: &IdeaQuery) -> Result<Vec<IdeaWithVotes>, ApiError> {
        Err(ApiError::store_disabled())
    }

    async fn list_by_statuses(&self, _statuses: &[IdeaStatus]) -> Result<Vec<Idea>, ApiError> {
        Err(ApiError::store_disabled())
    }

    async fn update_idea(
        &self,
        _idea: &Idea,
        _expected: Option<IdeaStatus>,
    ) -> Result<bool, ApiError> {
        Err(ApiError::store_disabled())
    }

    async fn bulk_set_status(
        &self,
        _ids: &[IdeaId],
        _target: BulkTarget,
        _now: DateTime<Utc>,
    ) -> Result<Vec<StreamSummary>, ApiError> {
        Err(ApiError::store_disabled())
    }
}

#[async_trait]
impl VoteLedger for UnavailableStore {
    async fn insert_vote(&self, _vote: &Vote) -> Result<VoteInsert, ApiError> {
        Err(ApiError::store_disabled())
    }

    async fn delete_vote(&self, _idea_id: &IdeaId, _voter_email: &str) -> Result<bool, ApiError> {
        Err(ApiError::store_disabled())
    }

    async fn count_votes(&self, _idea_id: &IdeaId) -> Result<i64, ApiError> {
        Err(ApiError::store_disabled())
    }

    async fn votes_by_voter(&self, _voter_email: &str) -> Result<Vec<IdeaId>, ApiError> {
        Err(ApiError::store_disabled())
    }

    async fn approved_vote_counts(&self) -> Result<Vec<(IdeaId, i64)>, ApiError> {
        Err(ApiError::store_disabled())
    }
}

#[async_trait]
impl UserRepository for UnavailableStore {
    async fn find_user(&self, _email: &str) -> Result<Option<UserProfile>, ApiError> {
        Err(ApiError::store_disabled())
    }

    async fn insert_user_if_absent(&self, _profile: &UserProfile) -> Result<(), ApiError> {
        Err(ApiError::store_disabled())
    }

    async fn promote_admin(&self, _email: &str, _now: DateTime<Utc>) -> Result<(), ApiError> {
        Err(ApiError::store_disabled())
    }

    async fn update_profile(
        &self,
        _email: &str,
        _update: &ProfileUpdate,
        _now: DateTime<Utc>,
    ) -> Result<Option<UserProfile>, ApiError> {
        Err(ApiError::store_disabled())
    }
}
