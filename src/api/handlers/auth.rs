//! Session handlers: who am I, development login, logout.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Utc;

use crate::api::dto::{LoginRequest, LogoutResponse, MeResponse};
use crate::api::extractors::Caller;
use crate::app_state::AppState;
use crate::domain::SessionClaims;
use crate::domain::session::SESSION_COOKIE;
use crate::error::{ApiError, ErrorResponse};

/// `GET /auth/me` — The caller's identity, or `null`.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    summary = "Current user",
    responses(
        (status = 200, description = "Identity or null", body = MeResponse),
    )
)]
pub async fn me(Caller(caller): Caller) -> impl IntoResponse {
    Json(MeResponse { user: caller })
}

/// `POST /auth/login` — Issue a session cookie for an email.
///
/// Only mounted in effect when development login is enabled; real
/// sessions come from the identity provider in front of the service.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when development login is disabled,
/// [`ApiError::ServiceUnavailable`] without a session secret, or
/// [`ApiError::Validation`] for an invalid email.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    summary = "Development login",
    description = "Issues a signed session cookie. Disabled unless DEV_LOGIN_ENABLED=true.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = MeResponse),
        (status = 400, description = "Valid email required", body = ErrorResponse),
        (status = 404, description = "Development login disabled", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.config.dev_login_enabled {
        return Err(ApiError::NotFound("Route"));
    }
    let codec = state.sessions.as_deref().ok_or_else(|| {
        ApiError::ServiceUnavailable("Sessions are not configured".to_string())
    })?;

    let email = req.email.trim().to_lowercase();
    let Some((local_part, _)) = email.split_once('@') else {
        return Err(ApiError::Validation("Valid email required".to_string()));
    };
    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(local_part)
        .to_string();

    let claims = SessionClaims::new(&email, Some(name), Utc::now(), state.config.session_ttl());
    let token = codec.encode(&claims);
    let identity = state.user_service.resolve(&claims).await;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    tracing::info!(email = %identity.email, is_admin = identity.is_admin, "development login");
    Ok((
        jar.add(cookie),
        Json(MeResponse {
            user: Some(identity),
        }),
    ))
}

/// `POST /auth/logout` — Clear the session cookie.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    summary = "Log out",
    responses(
        (status = 200, description = "Cookie cleared", body = LogoutResponse),
    )
)]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Json(LogoutResponse { success: true }),
    )
}

/// Auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(me))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}
