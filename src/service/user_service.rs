//! User service: resolves session claims to an [`Identity`] and manages
//! self-service profiles.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{Identity, ProfileUpdate, SessionClaims, UserProfile};
use crate::error::ApiError;
use crate::persistence::Store;

/// Identity resolution and profile storage.
#[derive(Debug, Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    admin_email: Option<String>,
}

impl UserService {
    /// Creates a new `UserService`. `admin_email` names the bootstrap
    /// administrator, compared case-insensitively.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, admin_email: Option<String>) -> Self {
        Self {
            store,
            admin_email: admin_email.map(|e| e.trim().to_lowercase()),
        }
    }

    /// Turns verified session claims into an identity.
    ///
    /// The user row is created on first sight and the bootstrap admin is
    /// promoted in the table. Store failures never fail the request: the
    /// admin flag then comes from the configured email alone.
    pub async fn resolve(&self, claims: &SessionClaims) -> Identity {
        let email = claims.email.trim().to_lowercase();
        let env_admin = self.admin_email.as_deref() == Some(email.as_str());

        let is_admin = match self.sync_user(&email, claims.name.clone(), env_admin).await {
            Ok(stored_admin) => stored_admin || env_admin,
            Err(err) => {
                tracing::warn!(%email, error = %err, "user lookup failed, using configured admin only");
                env_admin
            }
        };

        Identity {
            email,
            name: claims.name.clone(),
            is_admin,
        }
    }

    /// Loads the caller's profile, creating the row if needed.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn profile(&self, caller: &Identity) -> Result<UserProfile, ApiError> {
        if let Some(profile) = self.store.find_user(&caller.email).await? {
            return Ok(profile);
        }
        let profile = UserProfile::new(&caller.email, caller.name.clone(), caller.is_admin, Utc::now());
        self.store.insert_user_if_absent(&profile).await?;
        self.store
            .find_user(&caller.email)
            .await?
            .ok_or(ApiError::NotFound("User"))
    }

    /// Applies a validated profile edit.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn update_profile(
        &self,
        caller: &Identity,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, ApiError> {
        self.profile(caller).await?;
        let updated = self
            .store
            .update_profile(&caller.email, update, Utc::now())
            .await?
            .ok_or(ApiError::NotFound("User"))?;

        tracing::info!(email = %caller.email, "profile updated");
        Ok(updated)
    }

    /// Ensures the row exists and returns its stored admin flag.
    async fn sync_user(
        &self,
        email: &str,
        name: Option<String>,
        env_admin: bool,
    ) -> Result<bool, ApiError> {
        let now = Utc::now();
        match self.store.find_user(email).await? {
            Some(user) => {
                if env_admin && !user.is_admin {
                    self.store.promote_admin(email, now).await?;
                    tracing::info!(target: "audit", %email, "configured admin promoted");
                }
                Ok(user.is_admin)
            }
            None => {
                let profile = UserProfile::new(email, name, env_admin, now);
                self.store.insert_user_if_absent(&profile).await?;
                tracing::info!(%email, is_admin = env_admin, "user created");
                Ok(env_admin)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::persistence::memory::MemoryStore;
    use crate::persistence::unavailable::UnavailableStore;
    use crate::persistence::UserRepository;

    fn claims(email: &str) -> SessionClaims {
        SessionClaims::new(email, Some("Someone".to_string()), Utc::now(), Duration::hours(1))
    }

    #[tokio::test]
    async fn configured_admin_is_promoted_case_insensitively() {
        let store = Arc::new(MemoryStore::new());
        let service = UserService::new(
            Arc::clone(&store) as Arc<dyn Store>,
            Some("Admin@X.com".to_string()),
        );
        let existing = UserProfile::new("admin@x.com", None, false, Utc::now());
        let _ = store.insert_user_if_absent(&existing).await;

        let identity = service.resolve(&claims("ADMIN@x.com")).await;
        assert!(identity.is_admin);
        assert_eq!(identity.email, "admin@x.com");

        let Ok(Some(row)) = store.find_user("admin@x.com").await else {
            panic!("admin row missing");
        };
        assert!(row.is_admin);
    }

    #[tokio::test]
    async fn first_sight_creates_a_plain_user() {
        let store = Arc::new(MemoryStore::new());
        let service = UserService::new(Arc::clone(&store) as Arc<dyn Store>, None);
        let identity = service.resolve(&claims("u1@x.com")).await;
        assert!(!identity.is_admin);
        let Ok(Some(row)) = store.find_user("u1@x.com").await else {
            panic!("user row missing");
        };
        assert_eq!(row.name.as_deref(), Some("Someone"));
    }

    #[tokio::test]
    async fn stored_admin_flag_is_honoured() {
        let store = Arc::new(MemoryStore::new());
        let service = UserService::new(Arc::clone(&store) as Arc<dyn Store>, None);
        let _ = store
            .insert_user_if_absent(&UserProfile::new("boss@x.com", None, true, Utc::now()))
            .await;
        assert!(service.resolve(&claims("boss@x.com")).await.is_admin);
    }

    #[tokio::test]
    async fn unavailable_store_falls_back_to_configured_admin() {
        let service = UserService::new(Arc::new(UnavailableStore), Some("admin@x.com".to_string()));
        assert!(service.resolve(&claims("admin@x.com")).await.is_admin);
        assert!(!service.resolve(&claims("u1@x.com")).await.is_admin);
    }

    #[tokio::test]
    async fn profile_update_sets_full_name() {
        let service = UserService::new(Arc::new(MemoryStore::new()), None);
        let caller = service.resolve(&claims("u1@x.com")).await;
        let Ok(update) = ProfileUpdate::new(Some("Ada".into()), Some("Lovelace".into()), Some("Hi".into()))
        else {
            panic!("valid update");
        };
        let Ok(profile) = service.update_profile(&caller, &update).await else {
            panic!("update failed");
        };
        assert_eq!(profile.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(profile.bio.as_deref(), Some("Hi"));
    }
}
