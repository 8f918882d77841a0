//! # stream-ideas
//!
//! REST API and Server-Sent Events backend for a live-stream idea board.
//!
//! Viewers submit ideas for future streams and vote on them; an
//! administrator moderates submissions through a small lifecycle
//! (`Pending → Approved → Scheduled → Live → Completed`, plus
//! `Rejected` and `Cancelled`). Vote counts are pushed to every open
//! browser over SSE.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, EventSource)
//!     │
//!     ├── REST Handlers + extractors (api/)
//!     ├── Vote stream (sse/)
//!     │
//!     ├── IdeaService / VoteService / UserService (service/)
//!     ├── RateLimiter, VoteBroadcaster, lifecycle (domain/)
//!     │
//!     └── Store (persistence/)
//!           ├── PostgreSQL
//!           ├── in-memory
//!           └── unavailable (degraded mode)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod sse;
