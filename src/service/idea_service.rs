//! Idea service: submission, moderation, scheduling, and the stream
//! calendar.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;

use crate::domain::lifecycle::{self, StreamPatch};
use crate::domain::{BulkTarget, Identity, Idea, IdeaDraft, IdeaId, IdeaStatus, RateLimiter};
use crate::error::ApiError;
use crate::persistence::{IdeaQuery, IdeaSort, IdeaWithVotes, Store, StreamSummary, Visibility};

/// Orchestrates the idea repository and the status state machine.
///
/// Admin checks happen before these methods are called; the `actor`
/// arguments only feed the audit log.
#[derive(Debug, Clone)]
pub struct IdeaService {
    store: Arc<dyn Store>,
    submissions: Arc<RateLimiter>,
}

impl IdeaService {
    /// Creates a new `IdeaService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, submissions: Arc<RateLimiter>) -> Self {
        Self { store, submissions }
    }

    /// Validates and stores a new `Pending` idea.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RateLimited`] when `origin` exceeded the
    /// submission budget, [`ApiError::Validation`] for bad input, or a
    /// store error.
    pub async fn submit(
        &self,
        submitter: &Identity,
        origin: &str,
        title: &str,
        description: &str,
        category: Option<&str>,
    ) -> Result<Idea, ApiError> {
        self.submissions.check(origin)?;
        let draft = IdeaDraft::new(title, description, category)?;
        let idea = Idea::submitted(draft, &submitter.email, Utc::now());
        self.store.insert_idea(&idea).await?;

        tracing::info!(idea_id = %idea.id, submitted_by = %idea.submitted_by, "idea submitted");
        Ok(idea)
    }

    /// Lists ideas visible to `caller`. Returns an empty list while the
    /// store is disabled.
    ///
    /// # Errors
    ///
    /// Returns a store error other than [`ApiError::ServiceUnavailable`].
    pub async fn list(
        &self,
        caller: Option<&Identity>,
        status: Option<IdeaStatus>,
        sort: IdeaSort,
    ) -> Result<Vec<IdeaWithVotes>, ApiError> {
        let query = IdeaQuery {
            status,
            visibility: visibility_for(caller),
            sort,
        };
        match self.store.list_ideas(&query).await {
            Err(ApiError::ServiceUnavailable(reason)) => {
                tracing::warn!(%reason, "store disabled, returning no ideas");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Loads one idea if `caller` may see it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the idea does not exist or is not
    /// visible to `caller`.
    pub async fn get(
        &self,
        caller: Option<&Identity>,
        id: &IdeaId,
    ) -> Result<IdeaWithVotes, ApiError> {
        let item = self.load(id).await?;
        if visibility_for(caller).allows(&item.idea) {
            Ok(item)
        } else {
            Err(ApiError::NotFound("Idea"))
        }
    }

    /// Approves a `Pending` idea.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] or [`ApiError::InvalidTransition`].
    pub async fn approve(&self, actor: &Identity, id: &IdeaId) -> Result<Idea, ApiError> {
        let mut idea = self.load(id).await?.idea;
        let observed = idea.status;
        lifecycle::approve(&mut idea, Utc::now())?;
        if !self.store.update_idea(&idea, Some(observed)).await? {
            return Err(ApiError::InvalidTransition(
                "Can only approve pending ideas".to_string(),
            ));
        }

        tracing::info!(target: "audit", actor = %actor.email, idea_id = %id, "idea approved");
        Ok(idea)
    }

    /// Schedules an `Approved` idea for `date` with an optional link.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a missing or unparseable date,
    /// [`ApiError::NotFound`], or [`ApiError::InvalidTransition`].
    pub async fn schedule(
        &self,
        actor: &Identity,
        id: &IdeaId,
        date: Option<&str>,
        youtube_link: Option<&str>,
    ) -> Result<Idea, ApiError> {
        let date = match date.map(str::trim) {
            Some(raw) if !raw.is_empty() => lifecycle::parse_instant(raw)?,
            _ => return Err(ApiError::Validation("Scheduled date is required".to_string())),
        };
        let link = non_empty_link(youtube_link);

        let mut idea = self.load(id).await?.idea;
        let observed = idea.status;
        lifecycle::schedule(&mut idea, date, link, Utc::now())?;
        if !self.store.update_idea(&idea, Some(observed)).await? {
            return Err(ApiError::InvalidTransition(
                "Can only schedule approved ideas".to_string(),
            ));
        }

        tracing::info!(target: "audit", actor = %actor.email, idea_id = %id, %date, "idea scheduled");
        Ok(idea)
    }

    /// Forces any status, stamping its timestamp on first entry.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an unknown status name or
    /// [`ApiError::NotFound`].
    pub async fn set_status(
        &self,
        actor: &Identity,
        id: &IdeaId,
        status: Option<&str>,
    ) -> Result<Idea, ApiError> {
        let target = status
            .and_then(|s| s.parse::<IdeaStatus>().ok())
            .ok_or_else(|| {
                ApiError::Validation(format!(
                    "Invalid status. Must be one of: {}",
                    IdeaStatus::names()
                ))
            })?;

        let mut idea = self.load(id).await?.idea;
        let previous = idea.status;
        lifecycle::force_status(&mut idea, target, Utc::now());
        self.write(&idea).await?;

        tracing::info!(
            target: "audit",
            actor = %actor.email,
            idea_id = %id,
            from = %previous,
            to = %target,
            "idea status set"
        );
        Ok(idea)
    }

    /// Applies an admin stream patch.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a status outside the stream
    /// set or [`ApiError::NotFound`].
    pub async fn update_stream(
        &self,
        actor: &Identity,
        id: &IdeaId,
        patch: &StreamPatch,
    ) -> Result<Idea, ApiError> {
        let mut idea = self.load(id).await?.idea;
        lifecycle::apply_stream_patch(&mut idea, patch, Utc::now())?;
        self.write(&idea).await?;

        tracing::info!(
            target: "audit",
            actor = %actor.email,
            idea_id = %id,
            status = %idea.status,
            scheduled_date = ?idea.scheduled_date,
            youtube_link = ?idea.youtube_link,
            "stream updated"
        );
        Ok(idea)
    }

    /// Moves every listed stream to `target` in one atomic update. Ids
    /// that are unknown or not in a stream status are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an empty id list or a target
    /// outside {Live, Completed, Cancelled}.
    pub async fn bulk_set_status(
        &self,
        actor: &Identity,
        ids: &[IdeaId],
        target: Option<&str>,
    ) -> Result<Vec<StreamSummary>, ApiError> {
        if ids.is_empty() {
            return Err(ApiError::Validation("Stream IDs are required".to_string()));
        }
        let target = target
            .and_then(|s| s.parse::<IdeaStatus>().ok())
            .ok_or_else(|| ApiError::Validation("Valid status is required".to_string()))
            .and_then(BulkTarget::try_from)?;

        let updated = self.store.bulk_set_status(ids, target, Utc::now()).await?;

        tracing::info!(
            target: "audit",
            actor = %actor.email,
            status = %target.status(),
            requested = ids.len(),
            updated = updated.len(),
            "bulk stream status update"
        );
        Ok(updated)
    }

    /// Lists the stream calendar: upcoming streams by air date, then
    /// completed streams newest first. A `status` outside the stream set
    /// is ignored.
    ///
    /// # Errors
    ///
    /// Returns a store error other than [`ApiError::ServiceUnavailable`].
    pub async fn list_streams(&self, status: Option<IdeaStatus>) -> Result<Vec<Idea>, ApiError> {
        let statuses: Vec<IdeaStatus> = match status {
            Some(s) if s.is_stream() => vec![s],
            _ => IdeaStatus::STREAM.to_vec(),
        };
        let mut streams = match self.store.list_by_statuses(&statuses).await {
            Err(ApiError::ServiceUnavailable(reason)) => {
                tracing::warn!(%reason, "store disabled, returning no streams");
                return Ok(Vec::new());
            }
            other => other?,
        };
        streams.sort_by(calendar_order);
        Ok(streams)
    }

    async fn load(&self, id: &IdeaId) -> Result<IdeaWithVotes, ApiError> {
        self.store
            .find_idea(id)
            .await?
            .ok_or(ApiError::NotFound("Idea"))
    }

    async fn write(&self, idea: &Idea) -> Result<(), ApiError> {
        if self.store.update_idea(idea, None).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound("Idea"))
        }
    }
}

fn visibility_for(caller: Option<&Identity>) -> Visibility {
    match caller {
        Some(identity) if identity.is_admin => Visibility::Everything,
        Some(identity) => Visibility::ApprovedOrOwnedBy(identity.email.clone()),
        None => Visibility::ApprovedOnly,
    }
}

fn non_empty_link(link: Option<&str>) -> Option<String> {
    link.map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
}

/// Upcoming (Scheduled/Live) before Completed; upcoming ascending by air
/// date, completed descending by completion.
fn calendar_order(a: &Idea, b: &Idea) -> Ordering {
    let completed = |idea: &Idea| idea.status == IdeaStatus::Completed;
    match (completed(a), completed(b)) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => {
            let key = |idea: &Idea| idea.completed_at.unwrap_or(idea.updated_at);
            key(b).cmp(&key(a))
        }
        (false, false) => {
            let key = |idea: &Idea| idea.scheduled_date.unwrap_or(idea.updated_at);
            key(a).cmp(&key(b))
        }
    }
}
