//! Request extractors: caller identity and client origin.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use chrono::Utc;

use crate::app_state::AppState;
use crate::domain::Identity;
use crate::domain::session::SESSION_COOKIE;
use crate::error::ApiError;

/// Identity of the caller, if the session cookie verifies.
///
/// Resolved once per request and cached in the request extensions.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Identity>);

impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(cached) = parts.extensions.get::<Self>() {
            return Ok(cached.clone());
        }

        let caller = Self(resolve(&parts.headers, state).await);
        parts.extensions.insert(caller.clone());
        Ok(caller)
    }
}

async fn resolve(headers: &HeaderMap, state: &AppState) -> Option<Identity> {
    let codec = state.sessions.as_deref()?;
    let jar = CookieJar::from_headers(headers);
    let token = jar.get(SESSION_COOKIE)?;
    match codec.decode(token.value(), Utc::now()) {
        Ok(claims) => Some(state.user_service.resolve(&claims).await),
        Err(err) => {
            tracing::debug!(error = %err, "ignoring session cookie");
            None
        }
    }
}

/// An authenticated caller. Rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Ok(Caller(identity)) = Caller::from_request_parts(parts, state).await;
        identity.map(Self).ok_or(ApiError::AuthenticationRequired)
    }
}

/// An authenticated admin. Rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        if identity.is_admin {
            Ok(Self(identity))
        } else {
            tracing::warn!(email = %identity.email, "admin operation denied");
            Err(ApiError::AuthorizationDenied)
        }
    }
}

/// Rate-limit key of the client: first `X-Forwarded-For` hop, then
/// `X-Real-IP`, else `"unknown"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOrigin(pub String);

impl ClientOrigin {
    /// Derives the origin from request headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };
        let forwarded = header("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        let origin = forwarded.or_else(|| header("x-real-ip")).unwrap_or("unknown");
        Self(origin.to_string())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ClientOrigin {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn origin_prefers_first_forwarded_hop() {
        let map = headers(&[
            ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
            ("x-real-ip", "10.0.0.2"),
        ]);
        assert_eq!(ClientOrigin::from_headers(&map).0, "203.0.113.7");
    }

    #[test]
    fn origin_falls_back_to_real_ip_then_unknown() {
        let map = headers(&[("x-real-ip", "10.0.0.2")]);
        assert_eq!(ClientOrigin::from_headers(&map).0, "10.0.0.2");
        assert_eq!(ClientOrigin::from_headers(&HeaderMap::new()).0, "unknown");
    }
}
