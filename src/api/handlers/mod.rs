//! REST endpoint handlers organized by resource.

pub mod auth;
pub mod ideas;
pub mod streams;
pub mod system;
pub mod user;
pub mod votes;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(ideas::routes())
        .merge(votes::routes())
        .merge(streams::routes())
        .merge(user::routes())
        .merge(auth::routes())
}
