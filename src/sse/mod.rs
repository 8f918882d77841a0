//! Server-Sent Events layer: the live vote-count stream.
//!
//! `GET /api/ideas/vote-updates` holds the response open and writes one
//! `data:` frame per [`crate::domain::VoteEvent`]. The stream is one-way;
//! clients cast votes over the REST endpoints.

pub mod handler;
pub mod stream;
