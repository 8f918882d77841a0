//! Domain layer: ideas, their lifecycle, votes, identity, and the
//! in-process registries (vote fan-out, rate limiting).
//!
//! Nothing in here touches the network or the database; the service layer
//! combines these types with a store.

pub mod idea;
pub mod idea_id;
pub mod lifecycle;
pub mod rate_limiter;
pub mod session;
pub mod user;
pub mod vote;
pub mod vote_broadcaster;
pub mod vote_event;

pub use idea::{Idea, IdeaDraft, IdeaStatus};
pub use idea_id::IdeaId;
pub use lifecycle::{BulkTarget, StreamPatch};
pub use rate_limiter::RateLimiter;
pub use session::{SessionClaims, SessionCodec};
pub use user::{Identity, ProfileUpdate, UserProfile};
pub use vote::{Vote, VoteInsert, VoteTally};
pub use vote_broadcaster::VoteBroadcaster;
pub use vote_event::VoteEvent;
