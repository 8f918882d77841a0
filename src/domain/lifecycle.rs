//! Idea lifecycle state machine.
//!
//! Normal editorial flow:
//!
//! ```text
//! Pending ──► Approved ──► Scheduled ──► Live ──► Completed
//!    │                        │
//!    └──► Rejected            └──► Cancelled
//! ```
//!
//! `approve` and `schedule` are strict gates with a single legal source
//! state. The admin correction paths (`force_status`, stream patches, bulk
//! updates) skip the source check and only stamp timestamps.

use chrono::{DateTime, Utc};

use super::{Idea, IdeaStatus};
use crate::error::ApiError;

impl IdeaStatus {
    /// Returns `true` if `target` is a legal next step in the normal flow.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Approved | Self::Rejected)
                | (Self::Approved, Self::Scheduled)
                | (Self::Scheduled, Self::Live | Self::Cancelled)
                | (Self::Live, Self::Completed)
        )
    }
}

/// Target statuses accepted by the bulk stream operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkTarget {
    /// Mark streams as on air.
    Live,
    /// Mark streams as finished.
    Completed,
    /// Call streams off.
    Cancelled,
}

impl BulkTarget {
    /// The status written by the bulk update.
    #[must_use]
    pub const fn status(self) -> IdeaStatus {
        match self {
            Self::Live => IdeaStatus::Live,
            Self::Completed => IdeaStatus::Completed,
            Self::Cancelled => IdeaStatus::Cancelled,
        }
    }
}

impl TryFrom<IdeaStatus> for BulkTarget {
    type Error = ApiError;

    fn try_from(status: IdeaStatus) -> Result<Self, Self::Error> {
        match status {
            IdeaStatus::Live => Ok(Self::Live),
            IdeaStatus::Completed => Ok(Self::Completed),
            IdeaStatus::Cancelled => Ok(Self::Cancelled),
            _ => Err(ApiError::Validation("Valid status is required".to_string())),
        }
    }
}

/// Statuses an admin may set through the stream patch endpoint.
pub const STREAM_PATCH_STATUSES: [IdeaStatus; 4] = [
    IdeaStatus::Scheduled,
    IdeaStatus::Live,
    IdeaStatus::Completed,
    IdeaStatus::Cancelled,
];

/// Field patch for a stream. `None` leaves a field untouched; `Some(None)`
/// clears a nullable field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamPatch {
    /// New scheduled date, or clear it.
    pub scheduled_date: Option<Option<DateTime<Utc>>>,
    /// New link, or clear it.
    pub youtube_link: Option<Option<String>>,
    /// New status (one of [`STREAM_PATCH_STATUSES`]).
    pub status: Option<IdeaStatus>,
}

impl StreamPatch {
    /// Returns `true` when the patch changes nothing but `updated_at`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scheduled_date.is_none() && self.youtube_link.is_none() && self.status.is_none()
    }
}

/// Parses an air date: an RFC 3339 instant, or a bare `YYYY-MM-DD` taken
/// as midnight UTC.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] ("Invalid date format") otherwise.
pub fn parse_instant(input: &str) -> Result<DateTime<Utc>, ApiError> {
    let input = input.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(instant.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ApiError::Validation("Invalid date format".to_string()))
}

/// Moves a `Pending` idea to `Approved`.
///
/// # Errors
///
/// Returns [`ApiError::InvalidTransition`] from any other status; the
/// idea is left untouched.
pub fn approve(idea: &mut Idea, now: DateTime<Utc>) -> Result<(), ApiError> {
    if !idea.status.can_transition_to(IdeaStatus::Approved) {
        return Err(ApiError::InvalidTransition(
            "Can only approve pending ideas".to_string(),
        ));
    }
    enter(idea, IdeaStatus::Approved, now);
    Ok(())
}

/// Moves an `Approved` idea to `Scheduled` with its air date and link.
///
/// # Errors
///
/// Returns [`ApiError::InvalidTransition`] from any other status; the
/// idea is left untouched.
pub fn schedule(
    idea: &mut Idea,
    date: DateTime<Utc>,
    youtube_link: Option<String>,
    now: DateTime<Utc>,
) -> Result<(), ApiError> {
    if !idea.status.can_transition_to(IdeaStatus::Scheduled) {
        return Err(ApiError::InvalidTransition(
            "Can only schedule approved ideas".to_string(),
        ));
    }
    idea.scheduled_date = Some(date);
    idea.youtube_link = youtube_link;
    enter(idea, IdeaStatus::Scheduled, now);
    Ok(())
}

/// Sets any status without checking the source state.
pub fn force_status(idea: &mut Idea, target: IdeaStatus, now: DateTime<Utc>) {
    enter(idea, target, now);
}

/// Applies an admin stream patch.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] if the patch carries a status outside
/// [`STREAM_PATCH_STATUSES`]; the idea is left untouched.
pub fn apply_stream_patch(
    idea: &mut Idea,
    patch: &StreamPatch,
    now: DateTime<Utc>,
) -> Result<(), ApiError> {
    if let Some(status) = patch.status
        && !STREAM_PATCH_STATUSES.contains(&status)
    {
        return Err(ApiError::Validation("Invalid status".to_string()));
    }
    if let Some(date) = patch.scheduled_date {
        idea.scheduled_date = date;
    }
    if let Some(link) = &patch.youtube_link {
        idea.youtube_link.clone_from(link);
    }
    match patch.status {
        Some(status) => enter(idea, status, now),
        None => idea.updated_at = now,
    }
    Ok(())
}

/// Writes `status`, bumps `updated_at`, and stamps the status timestamp
/// the first time the idea enters it.
fn enter(idea: &mut Idea, status: IdeaStatus, now: DateTime<Utc>) {
    idea.status = status;
    idea.updated_at = now;
    if let Some(slot) = transition_stamp(idea, status) {
        slot.get_or_insert(now);
    }
}

/// The timestamp field recording entry into `status`, if it has one.
fn transition_stamp(idea: &mut Idea, status: IdeaStatus) -> Option<&mut Option<DateTime<Utc>>> {
    match status {
        IdeaStatus::Approved => Some(&mut idea.approved_at),
        IdeaStatus::Scheduled => Some(&mut idea.scheduled_at),
        IdeaStatus::Live => Some(&mut idea.live_at),
        IdeaStatus::Completed => Some(&mut idea.completed_at),
        IdeaStatus::Rejected => Some(&mut idea.rejected_at),
        IdeaStatus::Pending | IdeaStatus::Cancelled => None,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::domain::IdeaDraft;

    fn pending_idea() -> Idea {
        let Ok(draft) = IdeaDraft::new("Rust vs Go", "A friendly comparison stream", None) else {
            panic!("valid draft");
        };
        Idea::submitted(draft, "u1@x.com", Utc::now() - Duration::hours(1))
    }

    fn idea_in(status: IdeaStatus) -> Idea {
        let mut idea = pending_idea();
        idea.status = status;
        idea
    }

    #[test]
    fn normal_flow_table() {
        use IdeaStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Scheduled));
        assert!(Scheduled.can_transition_to(Live));
        assert!(Scheduled.can_transition_to(Cancelled));
        assert!(Live.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Scheduled));
        assert!(!Approved.can_transition_to(Live));
        for terminal in [Completed, Rejected, Cancelled] {
            for target in IdeaStatus::ALL {
                assert!(!terminal.can_transition_to(target));
            }
        }
    }

    #[test]
    fn approve_only_from_pending() {
        let now = Utc::now();
        let mut idea = pending_idea();
        assert!(approve(&mut idea, now).is_ok());
        assert_eq!(idea.status, IdeaStatus::Approved);
        assert_eq!(idea.approved_at, Some(now));
        assert_eq!(idea.updated_at, now);

        for status in IdeaStatus::ALL.into_iter().filter(|s| *s != IdeaStatus::Pending) {
            let mut other = idea_in(status);
            let before = other.clone();
            let result = approve(&mut other, now);
            assert!(matches!(result, Err(ApiError::InvalidTransition(_))));
            assert_eq!(other, before);
        }
    }

    #[test]
    fn schedule_only_from_approved() {
        let now = Utc::now();
        let Some(date) = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).single() else {
            panic!("valid date");
        };
        let mut idea = idea_in(IdeaStatus::Approved);
        let link = Some("https://youtu.be/abc".to_string());
        assert!(schedule(&mut idea, date, link.clone(), now).is_ok());
        assert_eq!(idea.status, IdeaStatus::Scheduled);
        assert_eq!(idea.scheduled_date, Some(date));
        assert_eq!(idea.youtube_link, link);
        assert_eq!(idea.scheduled_at, Some(now));

        let mut pending = pending_idea();
        let before = pending.clone();
        let result = schedule(&mut pending, date, None, now);
        assert!(
            matches!(result, Err(ApiError::InvalidTransition(msg)) if msg == "Can only schedule approved ideas")
        );
        assert_eq!(pending, before);

        for status in IdeaStatus::ALL.into_iter().filter(|s| *s != IdeaStatus::Approved) {
            let mut other = idea_in(status);
            assert!(matches!(
                schedule(&mut other, date, None, now),
                Err(ApiError::InvalidTransition(_))
            ));
        }
    }

    #[test]
    fn force_status_stamps_once() {
        let first = Utc::now();
        let later = first + Duration::minutes(5);
        let mut idea = idea_in(IdeaStatus::Scheduled);
        force_status(&mut idea, IdeaStatus::Live, first);
        force_status(&mut idea, IdeaStatus::Scheduled, later);
        force_status(&mut idea, IdeaStatus::Live, later);
        assert_eq!(idea.live_at, Some(first));
        assert_eq!(idea.updated_at, later);
    }

    #[test]
    fn force_status_ignores_source_state() {
        let now = Utc::now();
        let mut idea = idea_in(IdeaStatus::Completed);
        force_status(&mut idea, IdeaStatus::Rejected, now);
        assert_eq!(idea.status, IdeaStatus::Rejected);
        assert_eq!(idea.rejected_at, Some(now));
    }

    #[test]
    fn stream_patch_clears_and_sets_fields() {
        let now = Utc::now();
        let mut idea = idea_in(IdeaStatus::Scheduled);
        idea.scheduled_date = Some(now);
        idea.youtube_link = Some("https://youtu.be/old".to_string());

        let patch = StreamPatch {
            scheduled_date: Some(None),
            youtube_link: Some(Some("https://youtu.be/new".to_string())),
            status: Some(IdeaStatus::Completed),
        };
        assert!(apply_stream_patch(&mut idea, &patch, now).is_ok());
        assert_eq!(idea.scheduled_date, None);
        assert_eq!(idea.youtube_link.as_deref(), Some("https://youtu.be/new"));
        assert_eq!(idea.status, IdeaStatus::Completed);
        assert_eq!(idea.completed_at, Some(now));
    }

    #[test]
    fn stream_patch_rejects_non_stream_status() {
        let now = Utc::now();
        let mut idea = idea_in(IdeaStatus::Scheduled);
        let before = idea.clone();
        let patch = StreamPatch {
            youtube_link: Some(None),
            status: Some(IdeaStatus::Approved),
            ..StreamPatch::default()
        };
        assert!(matches!(
            apply_stream_patch(&mut idea, &patch, now),
            Err(ApiError::Validation(_))
        ));
        assert_eq!(idea, before);
    }

    #[test]
    fn empty_patch_only_touches_updated_at() {
        let now = Utc::now();
        let mut idea = idea_in(IdeaStatus::Live);
        assert!(StreamPatch::default().is_empty());
        assert!(apply_stream_patch(&mut idea, &StreamPatch::default(), now).is_ok());
        assert_eq!(idea.status, IdeaStatus::Live);
        assert_eq!(idea.updated_at, now);
    }

    #[test]
    fn parse_instant_accepts_rfc3339_and_dates() {
        let Some(expected) = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).single() else {
            panic!("valid date");
        };
        assert_eq!(parse_instant("2025-01-01T10:00:00Z"), Ok(expected));
        assert_eq!(parse_instant("2025-01-01T12:00:00+02:00"), Ok(expected));
        assert_eq!(
            parse_instant("2025-01-01").map(|d| d.timestamp()),
            Ok(expected.timestamp() - 10 * 3600)
        );
        assert!(matches!(
            parse_instant("next tuesday"),
            Err(ApiError::Validation(msg)) if msg == "Invalid date format"
        ));
    }

    #[test]
    fn bulk_target_accepts_only_three_statuses() {
        assert_eq!(BulkTarget::try_from(IdeaStatus::Live), Ok(BulkTarget::Live));
        assert_eq!(BulkTarget::Completed.status(), IdeaStatus::Completed);
        assert!(BulkTarget::try_from(IdeaStatus::Scheduled).is_err());
        assert!(BulkTarget::try_from(IdeaStatus::Approved).is_err());
    }
}
