//! Stream calendar DTOs.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::lifecycle::{self, StreamPatch};
use crate::domain::{Idea, IdeaId, IdeaStatus};
use crate::error::ApiError;
use crate::persistence::StreamSummary;

/// Query parameters for `GET /streams`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListStreamsParams {
    /// `Scheduled`, `Live`, or `Completed`; anything else is ignored.
    #[serde(default)]
    pub status: Option<String>,
}

impl ListStreamsParams {
    /// The status filter if it names a known status.
    #[must_use]
    pub fn status(&self) -> Option<IdeaStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Response body for `GET /streams`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StreamListResponse {
    /// Calendar-ordered streams.
    pub streams: Vec<Idea>,
}

/// Request body for `PUT /streams/{id}`. Absent fields are left alone;
/// `null` or `""` clears a nullable field.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStreamRequest {
    /// New air date.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub scheduled_date: Option<Option<String>>,
    /// New stream link.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub youtube_link: Option<Option<String>>,
    /// `Scheduled`, `Live`, `Completed`, or `Cancelled`.
    #[serde(default)]
    pub status: Option<String>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateStreamRequest {
    /// Validates the raw fields into a [`StreamPatch`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an unparseable date or an
    /// unknown status name.
    pub fn into_patch(self) -> Result<StreamPatch, ApiError> {
        let scheduled_date = match self.scheduled_date {
            None => None,
            Some(raw) => match raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                Some(date) => Some(Some(lifecycle::parse_instant(date)?)),
                None => Some(None),
            },
        };
        let youtube_link = self.youtube_link.map(|link| {
            link.map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
        });
        let status = match self.status {
            None => None,
            Some(raw) => Some(
                raw.parse::<IdeaStatus>()
                    .map_err(|_| ApiError::Validation("Invalid status".to_string()))?,
            ),
        };
        Ok(StreamPatch {
            scheduled_date,
            youtube_link,
            status,
        })
    }
}

/// Response body for `PUT /streams/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StreamResponse {
    /// Always `true`.
    pub ok: bool,
    /// The stream after the patch.
    pub stream: Idea,
}

/// Request body for `POST /streams/bulk`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatusRequest {
    /// Ideas to update.
    #[serde(default)]
    pub stream_ids: Vec<IdeaId>,
    /// `Live`, `Completed`, or `Cancelled`.
    #[serde(default)]
    pub status: Option<String>,
}

/// Response body for `POST /streams/bulk`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BulkStatusResponse {
    /// Always `true`.
    pub ok: bool,
    /// Number of rows changed.
    pub updated: usize,
    /// The changed rows.
    pub streams: Vec<StreamSummary>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn parse(json: &str) -> UpdateStreamRequest {
        let Ok(request) = serde_json::from_str(json) else {
            panic!("request should deserialize: {json}");
        };
        request
    }

    #[test]
    fn absent_null_and_empty_are_distinct() {
        let Ok(patch) = parse("{}").into_patch() else {
            panic!("empty patch is valid");
        };
        assert!(patch.is_empty());

        let Ok(patch) = parse(r#"{"scheduledDate": null, "youtubeLink": ""}"#).into_patch() else {
            panic!("clearing patch is valid");
        };
        assert_eq!(patch.scheduled_date, Some(None));
        assert_eq!(patch.youtube_link, Some(None));

        let Ok(patch) = parse(r#"{"scheduledDate": ""}"#).into_patch() else {
            panic!("empty date clears");
        };
        assert_eq!(patch.scheduled_date, Some(None));
    }

    #[test]
    fn bad_date_and_status_are_rejected() {
        let bad_date = parse(r#"{"scheduledDate": "tomorrow"}"#).into_patch();
        assert!(matches!(bad_date, Err(ApiError::Validation(msg)) if msg == "Invalid date format"));
        let bad_status = parse(r#"{"status": "Paused"}"#).into_patch();
        assert!(matches!(bad_status, Err(ApiError::Validation(msg)) if msg == "Invalid status"));
    }
}
