//! Caller identity and user profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;

const NAME_MAX: usize = 50;
const BIO_MAX: usize = 500;

/// The verified caller of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Lower-cased verified email.
    pub email: String,
    /// Display name, if known.
    pub name: Option<String>,
    /// Whether the caller may use admin operations.
    pub is_admin: bool,
}

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Lower-cased email (primary key).
    pub email: String,
    /// Full display name.
    pub name: Option<String>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Short self-description.
    pub bio: Option<String>,
    /// Admin role flag.
    pub is_admin: bool,
    /// Row creation instant.
    pub created_at: DateTime<Utc>,
    /// Last update instant.
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// A fresh profile for a first-time caller.
    #[must_use]
    pub fn new(email: &str, name: Option<String>, is_admin: bool, now: DateTime<Utc>) -> Self {
        Self {
            email: email.to_string(),
            name,
            first_name: None,
            last_name: None,
            bio: None,
            is_admin,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the editable fields with `update`.
    pub fn apply(&mut self, update: &ProfileUpdate, now: DateTime<Utc>) {
        self.first_name.clone_from(&update.first_name);
        self.last_name.clone_from(&update.last_name);
        self.bio.clone_from(&update.bio);
        self.name = update.full_name();
        self.updated_at = now;
    }
}

/// Validated self-service profile edit. Empty strings clear a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    first_name: Option<String>,
    last_name: Option<String>,
    bio: Option<String>,
}

impl ProfileUpdate {
    /// Validates raw fields.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when a name exceeds 50 characters
    /// or the bio exceeds 500.
    pub fn new(
        first_name: Option<String>,
        last_name: Option<String>,
        bio: Option<String>,
    ) -> Result<Self, ApiError> {
        let first_name = non_empty(first_name);
        let last_name = non_empty(last_name);
        let bio = non_empty(bio);

        if exceeds(first_name.as_deref(), NAME_MAX) {
            return Err(ApiError::Validation(
                "First name must be a string with max 50 characters".to_string(),
            ));
        }
        if exceeds(last_name.as_deref(), NAME_MAX) {
            return Err(ApiError::Validation(
                "Last name must be a string with max 50 characters".to_string(),
            ));
        }
        if exceeds(bio.as_deref(), BIO_MAX) {
            return Err(ApiError::Validation(
                "Bio must be a string with max 500 characters".to_string(),
            ));
        }

        Ok(Self {
            first_name,
            last_name,
            bio,
        })
    }

    /// Given name after validation.
    #[must_use]
    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    /// Family name after validation.
    #[must_use]
    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    /// Bio after validation.
    #[must_use]
    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    /// `"first last"`, whichever parts are present; `None` if neither.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name(), self.last_name()]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn exceeds(value: Option<&str>, max: usize) -> bool {
    value.is_some_and(|v| v.chars().count() > max)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_present_parts() {
        let Ok(update) = ProfileUpdate::new(Some("Ada".into()), Some("Lovelace".into()), None)
        else {
            panic!("valid update");
        };
        assert_eq!(update.full_name().as_deref(), Some("Ada Lovelace"));

        let Ok(update) = ProfileUpdate::new(None, Some("Lovelace".into()), None) else {
            panic!("valid update");
        };
        assert_eq!(update.full_name().as_deref(), Some("Lovelace"));

        let Ok(update) = ProfileUpdate::new(Some(String::new()), None, None) else {
            panic!("valid update");
        };
        assert_eq!(update.full_name(), None);
    }

    #[test]
    fn limits_are_enforced() {
        assert!(ProfileUpdate::new(Some("a".repeat(51)), None, None).is_err());
        assert!(ProfileUpdate::new(None, Some("a".repeat(51)), None).is_err());
        assert!(ProfileUpdate::new(None, None, Some("b".repeat(501))).is_err());
        assert!(ProfileUpdate::new(Some("a".repeat(50)), None, Some("b".repeat(500))).is_ok());
    }

    #[test]
    fn apply_overwrites_editable_fields() {
        let now = Utc::now();
        let mut profile = UserProfile::new("u1@x.com", Some("old".into()), false, now);
        profile.bio = Some("old bio".into());
        let Ok(update) = ProfileUpdate::new(Some("New".into()), None, None) else {
            panic!("valid update");
        };
        profile.apply(&update, now);
        assert_eq!(profile.name.as_deref(), Some("New"));
        assert_eq!(profile.bio, None);
        assert!(!profile.is_admin);
    }
}
