//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::{RateLimiter, SessionCodec, VoteBroadcaster};
use crate::persistence::Store;
use crate::service::{IdeaService, UserService, VoteService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
///
/// Every registry (rate-limit windows, open vote streams) lives here, so
/// each `AppState` is an isolated instance of the service.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Submission, moderation, and stream calendar.
    pub idea_service: Arc<IdeaService>,
    /// Vote ledger and realtime fan-out.
    pub vote_service: Arc<VoteService>,
    /// Identity resolution and profiles.
    pub user_service: Arc<UserService>,
    /// Session token codec; `None` when no secret is configured, in which
    /// case every caller is anonymous.
    pub sessions: Option<Arc<SessionCodec>>,
    /// Runtime configuration.
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wires services, registries, and the session codec around `store`.
    ///
    /// # Errors
    ///
    /// Returns [`hmac::digest::InvalidLength`] if the session secret is
    /// rejected by the MAC.
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Result<Self, hmac::digest::InvalidLength> {
        let sessions = config
            .session_secret
            .as_deref()
            .map(SessionCodec::new)
            .transpose()?
            .map(Arc::new);

        let submissions = Arc::new(RateLimiter::new(config.submission_rate_limit));
        let votes = Arc::new(RateLimiter::new(config.vote_rate_limit));
        let broadcaster = Arc::new(VoteBroadcaster::new());

        let idea_service = Arc::new(IdeaService::new(Arc::clone(&store), submissions));
        let vote_service = Arc::new(VoteService::new(Arc::clone(&store), votes, broadcaster));
        let user_service = Arc::new(UserService::new(store, config.admin_email.clone()));

        Ok(Self {
            idea_service,
            vote_service,
            user_service,
            sessions,
            config: Arc::new(config),
        })
    }
}
