//! Query types and typed database rows.
//!
//! Rows are mapped to domain records right at the repository boundary;
//! nothing untyped leaves the persistence layer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::idea::UnknownStatus;
use crate::domain::{Idea, IdeaId, IdeaStatus, UserProfile};
use crate::error::ApiError;

/// Which ideas a caller may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Admins see every idea.
    Everything,
    /// Authenticated users see approved ideas plus their own submissions.
    ApprovedOrOwnedBy(String),
    /// Anonymous callers see approved ideas only.
    ApprovedOnly,
}

impl Visibility {
    /// Returns `true` if `idea` is visible under this rule.
    #[must_use]
    pub fn allows(&self, idea: &Idea) -> bool {
        match self {
            Self::Everything => true,
            Self::ApprovedOrOwnedBy(email) => {
                idea.status == IdeaStatus::Approved || idea.submitted_by == *email
            }
            Self::ApprovedOnly => idea.status == IdeaStatus::Approved,
        }
    }
}

/// Sort order of idea listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdeaSort {
    /// Newest first.
    #[default]
    Created,
    /// Most votes first, newest first among ties.
    Votes,
    /// Most recently updated first.
    Updated,
}

impl IdeaSort {
    /// Parses the `sort` query parameter; unknown values fall back to
    /// [`IdeaSort::Created`].
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("votes") => Self::Votes,
            Some("updated") => Self::Updated,
            _ => Self::Created,
        }
    }

    /// `ORDER BY` clause for the listing query.
    #[must_use]
    pub const fn order_by(self) -> &'static str {
        match self {
            Self::Created => "i.created_at DESC",
            Self::Votes => "vote_count DESC, i.created_at DESC",
            Self::Updated => "i.updated_at DESC",
        }
    }
}

/// Filter and order for [`super::IdeaRepository::list_ideas`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaQuery {
    /// Only ideas with this status.
    pub status: Option<IdeaStatus>,
    /// Caller-dependent visibility rule.
    pub visibility: Visibility,
    /// Result order.
    pub sort: IdeaSort,
}

/// An idea together with its current vote count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdeaWithVotes {
    /// The idea record.
    #[serde(flatten)]
    pub idea: Idea,
    /// Number of votes on the idea.
    pub vote_count: i64,
}

/// Row returned by the bulk stream update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema, sqlx::FromRow)]
pub struct StreamSummary {
    /// Idea id.
    #[sqlx(try_from = "String")]
    pub id: IdeaId,
    /// Idea title.
    pub title: String,
    /// Status after the update.
    #[sqlx(try_from = "String")]
    pub status: IdeaStatus,
}

/// Column list shared by every idea query (table alias `i`).
pub const IDEA_COLUMNS: &str = "i.id, i.title, i.description, i.category, i.status, \
     i.submitted_by, i.submitted_at, i.created_at, i.updated_at, i.scheduled_date, \
     i.youtube_link, i.approved_at, i.scheduled_at, i.live_at, i.completed_at, i.rejected_at";

/// A row of the `ideas` table, optionally with an aggregated vote count.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IdeaRow {
    /// Primary key.
    pub id: String,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Category.
    pub category: String,
    /// Status name.
    pub status: String,
    /// Submitter email.
    pub submitted_by: String,
    /// Submission instant.
    pub submitted_at: DateTime<Utc>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last update instant.
    pub updated_at: DateTime<Utc>,
    /// Air date.
    pub scheduled_date: Option<DateTime<Utc>>,
    /// Stream link.
    pub youtube_link: Option<String>,
    /// Approval stamp.
    pub approved_at: Option<DateTime<Utc>>,
    /// Scheduling stamp.
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Live stamp.
    pub live_at: Option<DateTime<Utc>>,
    /// Completion stamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Rejection stamp.
    pub rejected_at: Option<DateTime<Utc>>,
    /// `COUNT(votes)` when the query joins votes, else 0.
    #[sqlx(default)]
    pub vote_count: i64,
}

impl TryFrom<IdeaRow> for IdeaWithVotes {
    type Error = ApiError;

    fn try_from(row: IdeaRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|e: UnknownStatus| ApiError::Persistence(e.to_string()))?;
        Ok(Self {
            idea: Idea {
                id: IdeaId::from(row.id),
                title: row.title,
                description: row.description,
                category: row.category,
                status,
                submitted_by: row.submitted_by,
                submitted_at: row.submitted_at,
                created_at: row.created_at,
                updated_at: row.updated_at,
                scheduled_date: row.scheduled_date,
                youtube_link: row.youtube_link,
                approved_at: row.approved_at,
                scheduled_at: row.scheduled_at,
                live_at: row.live_at,
                completed_at: row.completed_at,
                rejected_at: row.rejected_at,
            },
            vote_count: row.vote_count,
        })
    }
}

/// A row of the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    /// Primary key.
    pub email: String,
    /// Full name.
    pub name: Option<String>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Bio.
    pub bio: Option<String>,
    /// Admin flag.
    pub is_admin: bool,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last update instant.
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        Self {
            email: row.email,
            name: row.name,
            first_name: row.first_name,
            last_name: row.last_name,
            bio: row.bio,
            is_admin: row.is_admin,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::IdeaDraft;

    fn idea(status: IdeaStatus, by: &str) -> Idea {
        let Ok(draft) = IdeaDraft::new("Rust vs Go", "Comparing two languages live", None) else {
            panic!("valid draft");
        };
        let mut idea = Idea::submitted(draft, by, Utc::now());
        idea.status = status;
        idea
    }

    #[test]
    fn visibility_rules() {
        let own_pending = idea(IdeaStatus::Pending, "me@x.com");
        let other_pending = idea(IdeaStatus::Pending, "you@x.com");
        let approved = idea(IdeaStatus::Approved, "you@x.com");

        let mine = Visibility::ApprovedOrOwnedBy("me@x.com".to_string());
        assert!(mine.allows(&own_pending));
        assert!(!mine.allows(&other_pending));
        assert!(mine.allows(&approved));

        assert!(!Visibility::ApprovedOnly.allows(&own_pending));
        assert!(Visibility::ApprovedOnly.allows(&approved));
        assert!(Visibility::Everything.allows(&other_pending));
    }

    #[test]
    fn sort_param_parsing() {
        assert_eq!(IdeaSort::from_param(Some("votes")), IdeaSort::Votes);
        assert_eq!(IdeaSort::from_param(Some("updated")), IdeaSort::Updated);
        assert_eq!(IdeaSort::from_param(Some("bogus")), IdeaSort::Created);
        assert_eq!(IdeaSort::from_param(None), IdeaSort::Created);
    }

    #[test]
    fn idea_with_votes_flattens() {
        let item = IdeaWithVotes {
            idea: idea(IdeaStatus::Approved, "u@x.com"),
            vote_count: 2,
        };
        let Ok(json) = serde_json::to_value(&item) else {
            panic!("serializable");
        };
        assert_eq!(json.get("voteCount"), Some(&serde_json::json!(2)));
        assert_eq!(json.get("status"), Some(&serde_json::json!("Approved")));
        assert_eq!(json.get("submittedBy"), Some(&serde_json::json!("u@x.com")));
    }

    #[test]
    fn unknown_status_row_is_a_persistence_error() {
        let now = Utc::now();
        let row = IdeaRow {
            id: "idea-1".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            category: "General".to_string(),
            status: "Archived".to_string(),
            submitted_by: "u@x.com".to_string(),
            submitted_at: now,
            created_at: now,
            updated_at: now,
            scheduled_date: None,
            youtube_link: None,
            approved_at: None,
            scheduled_at: None,
            live_at: None,
            completed_at: None,
            rejected_at: None,
            vote_count: 0,
        };
        assert!(matches!(
            IdeaWithVotes::try_from(row),
            Err(ApiError::Persistence(_))
        ));
    }
}
