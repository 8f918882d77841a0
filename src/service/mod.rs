//! Service layer: business logic orchestration.
//!
//! [`IdeaService`] drives submission and the status state machine,
//! [`VoteService`] the vote ledger and its realtime fan-out, and
//! [`UserService`] identity resolution and profiles. All three share one
//! [`crate::persistence::Store`].

pub mod idea_service;
pub mod user_service;
pub mod vote_service;

pub use idea_service::IdeaService;
pub use user_service::UserService;
pub use vote_service::{VoteService, VoteSubscription};
