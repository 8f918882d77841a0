//! Persistence layer: repository traits and their backends.
//!
//! The service layer talks to a single [`Store`] (ideas, the vote ledger,
//! users). One backend is picked at composition time:
//!
//! - [`postgres::PostgresStore`]: `sqlx::PgPool`, lazily connecting.
//! - [`memory::MemoryStore`]: process-local maps, used by tests and for
//!   running without a database.
//! - [`unavailable::UnavailableStore`]: degraded mode when no database is
//!   configured; every call fails with `ServiceUnavailable`.

pub mod memory;
pub mod models;
pub mod postgres;
pub mod unavailable;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{BulkTarget, Idea, IdeaId, IdeaStatus, ProfileUpdate, UserProfile, Vote, VoteInsert};
use crate::error::ApiError;

pub use models::{IdeaQuery, IdeaSort, IdeaWithVotes, StreamSummary, Visibility};

/// Storage of ideas and their lifecycle fields.
#[async_trait]
pub trait IdeaRepository: fmt::Debug + Send + Sync {
    /// Inserts a new idea.
    async fn insert_idea(&self, idea: &Idea) -> Result<(), ApiError>;

    /// Loads one idea with its vote count.
    async fn find_idea(&self, id: &IdeaId) -> Result<Option<IdeaWithVotes>, ApiError>;

    /// Lists ideas with vote counts, filtered and sorted per `query`.
    async fn list_ideas(&self, query: &IdeaQuery) -> Result<Vec<IdeaWithVotes>, ApiError>;

    /// Lists ideas whose status is one of `statuses`, unordered.
    async fn list_by_statuses(&self, statuses: &[IdeaStatus]) -> Result<Vec<Idea>, ApiError>;

    /// Writes every mutable field of `idea`. When `expected` is set the
    /// write only happens if the stored status still equals it.
    ///
    /// Returns `false` if nothing was written.
    async fn update_idea(&self, idea: &Idea, expected: Option<IdeaStatus>)
    -> Result<bool, ApiError>;

    /// Sets `target` on every id in `ids` whose status is a stream status,
    /// in one atomic operation. Returns the updated rows.
    async fn bulk_set_status(
        &self,
        ids: &[IdeaId],
        target: BulkTarget,
        now: DateTime<Utc>,
    ) -> Result<Vec<StreamSummary>, ApiError>;
}

/// Append-only (idea, voter) records with aggregate reads.
#[async_trait]
pub trait VoteLedger: fmt::Debug + Send + Sync {
    /// Inserts `vote` unless the same (idea, voter) pair already exists.
    async fn insert_vote(&self, vote: &Vote) -> Result<VoteInsert, ApiError>;

    /// Deletes the (idea, voter) row. Returns `false` if there was none.
    async fn delete_vote(&self, idea_id: &IdeaId, voter_email: &str) -> Result<bool, ApiError>;

    /// Counts votes on one idea.
    async fn count_votes(&self, idea_id: &IdeaId) -> Result<i64, ApiError>;

    /// Ids of every idea `voter_email` has voted on.
    async fn votes_by_voter(&self, voter_email: &str) -> Result<Vec<IdeaId>, ApiError>;

    /// Vote counts for every `Approved` idea, including zero counts.
    async fn approved_vote_counts(&self) -> Result<Vec<(IdeaId, i64)>, ApiError>;
}

/// Storage of user profiles and admin flags.
#[async_trait]
pub trait UserRepository: fmt::Debug + Send + Sync {
    /// Loads a profile by lower-cased email.
    async fn find_user(&self, email: &str) -> Result<Option<UserProfile>, ApiError>;

    /// Inserts `profile` unless a row with the same email exists.
    async fn insert_user_if_absent(&self, profile: &UserProfile) -> Result<(), ApiError>;

    /// Sets the admin flag on an existing user.
    async fn promote_admin(&self, email: &str, now: DateTime<Utc>) -> Result<(), ApiError>;

    /// Applies a profile edit. Returns `None` if the user does not exist.
    async fn update_profile(
        &self,
        email: &str,
        update: &ProfileUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<UserProfile>, ApiError>;
}

/// Everything the services need from a backend.
pub trait Store: IdeaRepository + VoteLedger + UserRepository {}

impl<T: IdeaRepository + VoteLedger + UserRepository> Store for T {}
