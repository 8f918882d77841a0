//! Process-local store backed by a single `tokio::sync::RwLock`.
//!
//! Every mutation runs under the write lock, so conditional updates and
//! bulk updates are atomic in the same way as their SQL counterparts.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{
    IdeaQuery, IdeaRepository, IdeaSort, IdeaWithVotes, StreamSummary, UserRepository,
    VoteLedger,
};
use crate::domain::lifecycle;
use crate::domain::{
    BulkTarget, Idea, IdeaId, IdeaStatus, ProfileUpdate, UserProfile, Vote, VoteInsert,
};
use crate::error::ApiError;

#[derive(Debug, Default)]
struct State {
    ideas: HashMap<IdeaId, Idea>,
    /// Keyed by `(idea, voter)`, which enforces one vote per pair.
    votes: HashMap<(IdeaId, String), Vote>,
    users: HashMap<String, UserProfile>,
}

impl State {
    fn count_votes(&self, idea_id: &IdeaId) -> i64 {
        let count = self.votes.keys().filter(|(id, _)| id == idea_id).count();
        i64::try_from(count).unwrap_or(i64::MAX)
    }

    fn with_votes(&self, idea: &Idea) -> IdeaWithVotes {
        IdeaWithVotes {
            idea: idea.clone(),
            vote_count: self.count_votes(&idea.id),
        }
    }
}

/// In-memory store for tests and database-less runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdeaRepository for MemoryStore {
    async fn insert_idea(&self, idea: &Idea) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        if state.ideas.contains_key(&idea.id) {
            return Err(ApiError::Persistence(format!("duplicate idea id {}", idea.id)));
        }
        state.ideas.insert(idea.id.clone(), idea.clone());
        Ok(())
    }

    async fn find_idea(&self, id: &IdeaId) -> Result<Option<IdeaWithVotes>, ApiError> {
        let state = self.state.read().await;
        Ok(state.ideas.get(id).map(|idea| state.with_votes(idea)))
    }

    async fn list_ideas(&self, query: &IdeaQuery) -> Result<Vec<IdeaWithVotes>, ApiError> {
        let state = self.state.read().await;
        let mut items: Vec<IdeaWithVotes> = state
            .ideas
            .values()
            .filter(|idea| query.status.is_none_or(|status| idea.status == status))
            .filter(|idea| query.visibility.allows(idea))
            .map(|idea| state.with_votes(idea))
            .collect();

        match query.sort {
            IdeaSort::Created => items.sort_by(|a, b| b.idea.created_at.cmp(&a.idea.created_at)),
            IdeaSort::Votes => items.sort_by(|a, b| {
                b.vote_count
                    .cmp(&a.vote_count)
                    .then_with(|| b.idea.created_at.cmp(&a.idea.created_at))
            }),
            IdeaSort::Updated => items.sort_by(|a, b| b.idea.updated_at.cmp(&a.idea.updated_at)),
        }
        Ok(items)
    }

    async fn list_by_statuses(&self, statuses: &[IdeaStatus]) -> Result<Vec<Idea>, ApiError> {
        let state = self.state.read().await;
        Ok(state
            .ideas
            .values()
            .filter(|idea| statuses.contains(&idea.status))
            .cloned()
            .collect())
    }

    async fn update_idea(
        &self,
        idea: &Idea,
        expected: Option<IdeaStatus>,
    ) -> Result<bool, ApiError> {
        let mut state = self.state.write().await;
        let Some(stored) = state.ideas.get_mut(&idea.id) else {
            return Ok(false);
        };
        if expected.is_some_and(|status| stored.status != status) {
            return Ok(false);
        }
        stored.status = idea.status;
        stored.updated_at = idea.updated_at;
        stored.scheduled_date = idea.scheduled_date;
        stored.youtube_link.clone_from(&idea.youtube_link);
        stored.approved_at = idea.approved_at;
        stored.scheduled_at = idea.scheduled_at;
        stored.live_at = idea.live_at;
        stored.completed_at = idea.completed_at;
        stored.rejected_at = idea.rejected_at;
        Ok(true)
    }

    async fn bulk_set_status(
        &self,
        ids: &[IdeaId],
        target: BulkTarget,
        now: DateTime<Utc>,
    ) -> Result<Vec<StreamSummary>, ApiError> {
        let mut state = self.state.write().await;
        let mut updated = Vec::new();
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                continue;
            }
            let Some(idea) = state.ideas.get_mut(id) else {
                continue;
            };
            if !idea.status.is_stream() {
                continue;
            }
            lifecycle::force_status(idea, target.status(), now);
            updated.push(StreamSummary {
                id: idea.id.clone(),
                title: idea.title.clone(),
                status: idea.status,
            });
        }
        Ok(updated)
    }
}

#[async_trait]
impl VoteLedger for MemoryStore {
    async fn insert_vote(&self, vote: &Vote) -> Result<VoteInsert, ApiError> {
        let mut state = self.state.write().await;
        let key = (vote.idea_id.clone(), vote.voter_email.clone());
        if state.votes.contains_key(&key) {
            return Ok(VoteInsert::Duplicate);
        }
        state.votes.insert(key, vote.clone());
        Ok(VoteInsert::Inserted)
    }

    async fn delete_vote(&self, idea_id: &IdeaId, voter_email: &str) -> Result<bool, ApiError> {
        let mut state = self.state.write().await;
        Ok(state
            .votes
            .remove(&(idea_id.clone(), voter_email.to_string()))
            .is_some())
    }

    async fn count_votes(&self, idea_id: &IdeaId) -> Result<i64, ApiError> {
        Ok(self.state.read().await.count_votes(idea_id))
    }

    async fn votes_by_voter(&self, voter_email: &str) -> Result<Vec<IdeaId>, ApiError> {
        let state = self.state.read().await;
        let mut votes: Vec<&Vote> = state
            .votes
            .values()
            .filter(|vote| vote.voter_email == voter_email)
            .collect();
        votes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(votes.into_iter().map(|vote| vote.idea_id.clone()).collect())
    }

    async fn approved_vote_counts(&self) -> Result<Vec<(IdeaId, i64)>, ApiError> {
        let state = self.state.read().await;
        Ok(state
            .ideas
            .values()
            .filter(|idea| idea.status == IdeaStatus::Approved)
            .map(|idea| (idea.id.clone(), state.count_votes(&idea.id)))
            .collect())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user(&self, email: &str) -> Result<Option<UserProfile>, ApiError> {
        Ok(self.state.read().await.users.get(email).cloned())
    }

    async fn insert_user_if_absent(&self, profile: &UserProfile) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        state
            .users
            .entry(profile.email.clone())
            .or_insert_with(|| profile.clone());
        Ok(())
    }

    async fn promote_admin(&self, email: &str, now: DateTime<Utc>) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        if let Some(user) = state.users.get_mut(email) {
            user.is_admin = true;
            user.updated_at = now;
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        email: &str,
        update: &ProfileUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<UserProfile>, ApiError> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(email).map(|user| {
            user.apply(update, now);
            user.clone()
        }))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::IdeaDraft;
    use crate::persistence::Visibility;

    fn idea(title: &str, by: &str, status: IdeaStatus, at: DateTime<Utc>) -> Idea {
        let Ok(draft) = IdeaDraft::new(title, "A description long enough", None) else {
            panic!("valid draft");
        };
        let mut idea = Idea::submitted(draft, by, at);
        idea.status = status;
        idea
    }

    async fn insert(store: &MemoryStore, idea: &Idea) {
        let Ok(()) = store.insert_idea(idea).await else {
            panic!("insert failed");
        };
    }

    #[tokio::test]
    async fn vote_pair_is_unique() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let target = idea("Rust vs Go", "a@x.com", IdeaStatus::Approved, now);
        insert(&store, &target).await;

        let first = store.insert_vote(&Vote::new(target.id.clone(), "u1@x.com", now)).await;
        let second = store.insert_vote(&Vote::new(target.id.clone(), "u1@x.com", now)).await;
        assert_eq!(first, Ok(VoteInsert::Inserted));
        assert_eq!(second, Ok(VoteInsert::Duplicate));
        assert_eq!(store.count_votes(&target.id).await, Ok(1));

        assert_eq!(store.delete_vote(&target.id, "u1@x.com").await, Ok(true));
        assert_eq!(store.delete_vote(&target.id, "u1@x.com").await, Ok(false));
        assert_eq!(store.count_votes(&target.id).await, Ok(0));
    }

    #[tokio::test]
    async fn list_sorts_by_votes_then_recency() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let older = idea("Older idea", "a@x.com", IdeaStatus::Approved, now - Duration::hours(2));
        let newer = idea("Newer idea", "a@x.com", IdeaStatus::Approved, now - Duration::hours(1));
        let popular = idea("Popular idea", "a@x.com", IdeaStatus::Approved, now - Duration::hours(3));
        for i in [&older, &newer, &popular] {
            insert(&store, i).await;
        }
        let _ = store.insert_vote(&Vote::new(popular.id.clone(), "v@x.com", now)).await;

        let query = IdeaQuery {
            status: None,
            visibility: Visibility::ApprovedOnly,
            sort: IdeaSort::Votes,
        };
        let Ok(items) = store.list_ideas(&query).await else {
            panic!("list failed");
        };
        let titles: Vec<&str> = items.iter().map(|i| i.idea.title.as_str()).collect();
        assert_eq!(titles, ["Popular idea", "Newer idea", "Older idea"]);
        assert_eq!(items.first().map(|i| i.vote_count), Some(1));
    }

    #[tokio::test]
    async fn conditional_update_loses_to_changed_status() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let stored = idea("Rust vs Go", "a@x.com", IdeaStatus::Approved, now);
        insert(&store, &stored).await;

        let mut approved = stored.clone();
        approved.status = IdeaStatus::Approved;
        assert_eq!(
            store.update_idea(&approved, Some(IdeaStatus::Pending)).await,
            Ok(false)
        );
        assert_eq!(store.update_idea(&approved, None).await, Ok(true));
    }

    #[tokio::test]
    async fn bulk_skips_non_stream_ideas() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let pending = idea("Pending idea", "a@x.com", IdeaStatus::Pending, now);
        let first = idea("First stream", "a@x.com", IdeaStatus::Scheduled, now);
        let second = idea("Second stream", "a@x.com", IdeaStatus::Scheduled, now);
        for i in [&pending, &first, &second] {
            insert(&store, i).await;
        }
        let ids = vec![pending.id.clone(), first.id.clone(), second.id.clone()];
        let Ok(updated) = store.bulk_set_status(&ids, BulkTarget::Completed, now).await else {
            panic!("bulk failed");
        };
        assert_eq!(updated.len(), 2);
        assert!(updated.iter().all(|s| s.status == IdeaStatus::Completed));

        let Ok(Some(untouched)) = store.find_idea(&pending.id).await else {
            panic!("pending idea missing");
        };
        assert_eq!(untouched.idea.status, IdeaStatus::Pending);
        let Ok(Some(done)) = store.find_idea(&first.id).await else {
            panic!("stream missing");
        };
        assert_eq!(done.idea.completed_at, Some(now));
    }

    #[tokio::test]
    async fn approved_counts_include_zero() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let approved = idea("Approved idea", "a@x.com", IdeaStatus::Approved, now);
        let pending = idea("Pending idea", "a@x.com", IdeaStatus::Pending, now);
        insert(&store, &approved).await;
        insert(&store, &pending).await;
        let Ok(counts) = store.approved_vote_counts().await else {
            panic!("counts failed");
        };
        assert_eq!(counts, vec![(approved.id.clone(), 0)]);
    }

    #[tokio::test]
    async fn user_upsert_keeps_first_row() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let first = UserProfile::new("u1@x.com", Some("First".into()), false, now);
        let second = UserProfile::new("u1@x.com", Some("Second".into()), true, now);
        let _ = store.insert_user_if_absent(&first).await;
        let _ = store.insert_user_if_absent(&second).await;
        let Ok(Some(user)) = store.find_user("u1@x.com").await else {
            panic!("user missing");
        };
        assert_eq!(user.name.as_deref(), Some("First"));
        assert!(!user.is_admin);

        let _ = store.promote_admin("u1@x.com", now).await;
        let Ok(Some(user)) = store.find_user("u1@x.com").await else {
            panic!("user missing");
        };
        assert!(user.is_admin);
    }
}
