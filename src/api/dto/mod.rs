//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names are camelCase on the wire.

pub mod idea_dto;
pub mod stream_dto;
pub mod user_dto;
pub mod vote_dto;

pub use idea_dto::*;
pub use stream_dto::*;
pub use user_dto::*;
pub use vote_dto::*;
