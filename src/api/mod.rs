//! REST API layer: route handlers, DTOs, extractors, and router
//! composition.
//!
//! Resource endpoints are mounted under `/api`; `/health` and the
//! OpenAPI docs sit at the root.

pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod openapi;

use axum::Router;
use axum::routing::get;

use crate::app_state::AppState;
use crate::sse::handler::vote_updates;

/// Builds the complete API router with all REST and SSE endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest(
            "/api",
            handlers::routes().route("/ideas/vote-updates", get(vote_updates)),
        )
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        router.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
}
