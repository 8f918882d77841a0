//! The idea record, its status enum, and submission validation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::IdeaId;
use crate::error::ApiError;

/// Title length bounds, in characters.
pub const TITLE_LEN: std::ops::RangeInclusive<usize> = 3..=200;
/// Description length bounds, in characters.
pub const DESCRIPTION_LEN: std::ops::RangeInclusive<usize> = 10..=2000;
/// Category used when the submitter leaves it blank.
pub const DEFAULT_CATEGORY: &str = "General";

/// Lifecycle status of an idea.
///
/// Serialized with the variant name (`"Pending"`, `"Approved"`, ...) in
/// JSON and in the `ideas.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum IdeaStatus {
    /// Submitted, awaiting moderation.
    Pending,
    /// Accepted by an admin; open for voting.
    Approved,
    /// Declined by an admin.
    Rejected,
    /// Given a stream date.
    Scheduled,
    /// Stream in progress.
    Live,
    /// Stream finished.
    Completed,
    /// Scheduled stream called off.
    Cancelled,
}

impl IdeaStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Approved,
        Self::Rejected,
        Self::Scheduled,
        Self::Live,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Statuses that make an idea part of the stream calendar.
    pub const STREAM: [Self; 3] = [Self::Scheduled, Self::Live, Self::Completed];

    /// Returns the canonical name used on the wire and in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Scheduled => "Scheduled",
            Self::Live => "Live",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Returns `true` for statuses shown on the stream calendar.
    #[must_use]
    pub const fn is_stream(self) -> bool {
        matches!(self, Self::Scheduled | Self::Live | Self::Completed)
    }

    /// Comma-separated list of every status name, for error messages.
    #[must_use]
    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown idea status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for IdeaStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl TryFrom<String> for IdeaStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A user-submitted proposal moving through the editorial lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    /// Opaque unique id.
    pub id: IdeaId,
    /// Sanitized title, 3–200 characters.
    pub title: String,
    /// Sanitized description, 10–2000 characters.
    pub description: String,
    /// Free-text category.
    pub category: String,
    /// Current lifecycle status.
    pub status: IdeaStatus,
    /// Email of the submitter.
    pub submitted_by: String,
    /// Submission instant.
    pub submitted_at: DateTime<Utc>,
    /// Row creation instant (equal to `submitted_at`).
    pub created_at: DateTime<Utc>,
    /// Last mutation instant.
    pub updated_at: DateTime<Utc>,
    /// When the stream is planned to air.
    pub scheduled_date: Option<DateTime<Utc>>,
    /// Link to the stream recording or live page.
    pub youtube_link: Option<String>,
    /// When the idea first became `Approved`.
    pub approved_at: Option<DateTime<Utc>>,
    /// When the idea first became `Scheduled`.
    pub scheduled_at: Option<DateTime<Utc>>,
    /// When the idea first went `Live`.
    pub live_at: Option<DateTime<Utc>>,
    /// When the idea first became `Completed`.
    pub completed_at: Option<DateTime<Utc>>,
    /// When the idea was first `Rejected`.
    pub rejected_at: Option<DateTime<Utc>>,
}

impl Idea {
    /// Builds a freshly submitted idea in `Pending` state. All creation
    /// timestamps share the same instant.
    #[must_use]
    pub fn submitted(draft: IdeaDraft, submitted_by: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: IdeaId::generate(),
            title: draft.title,
            description: draft.description,
            category: draft.category,
            status: IdeaStatus::Pending,
            submitted_by: submitted_by.to_string(),
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
        }
    }
}

/// A validated, sanitized submission that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaDraft {
    title: String,
    description: String,
    category: String,
}

impl IdeaDraft {
    /// Sanitizes and validates raw submission fields.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the title or description is
    /// out of bounds after sanitization.
    pub fn new(title: &str, description: &str, category: Option<&str>) -> Result<Self, ApiError> {
        let title = sanitize(title);
        let description = sanitize(description);
        let category = category.map(sanitize).unwrap_or_default();

        if !TITLE_LEN.contains(&title.chars().count()) {
            return Err(ApiError::Validation(format!(
                "Title must be between {} and {} characters",
                TITLE_LEN.start(),
                TITLE_LEN.end()
            )));
        }
        if !DESCRIPTION_LEN.contains(&description.chars().count()) {
            return Err(ApiError::Validation(format!(
                "Description must be between {} and {} characters",
                DESCRIPTION_LEN.start(),
                DESCRIPTION_LEN.end()
            )));
        }

        Ok(Self {
            title,
            description,
            category: if category.is_empty() {
                DEFAULT_CATEGORY.to_string()
            } else {
                category
            },
        })
    }

    /// Sanitized title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Sanitized category, defaulted.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }
}

/// Trims surrounding whitespace and strips angle brackets.
#[must_use]
pub fn sanitize(input: &str) -> String {
    input.trim().replace(['<', '>'], "")
}
