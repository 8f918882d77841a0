//! Type-safe idea identifier.
//!
//! [`IdeaId`] wraps the opaque string key of an idea so it cannot be
//! confused with voter emails or other strings flowing through the same
//! handlers.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for an idea.
///
/// Generated once at submission time (`idea-<uuid>`) and immutable
/// thereafter. Used as the primary key in storage, the key of vote-count
/// snapshots, and the subject of vote-update events. Ids coming from the
/// outside are accepted verbatim; they simply fail to resolve if unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct IdeaId(String);

impl IdeaId {
    /// Creates a new random `IdeaId`.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("idea-{}", uuid::Uuid::new_v4().simple()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id, returning the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for IdeaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for IdeaId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for IdeaId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for IdeaId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_unique_prefixed_ids() {
        let a = IdeaId::generate();
        let b = IdeaId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("idea-"));
        assert_eq!(a.as_str().len(), "idea-".len() + 32);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = IdeaId::from("idea-1");
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("\"idea-1\""));
    }

    #[test]
    fn works_as_map_key() {
        use std::collections::HashMap;
        let id = IdeaId::from("idea-7");
        let mut map = HashMap::new();
        map.insert(id.clone(), 3);
        assert_eq!(map.get(&id), Some(&3));
    }
}
