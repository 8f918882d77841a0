//! Service error types with HTTP status code mapping.
//!
//! [`ApiError`] is the central error type. Each variant maps to a specific
//! HTTP status code and structured JSON error response.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1002,
///     "message": "Can only approve pending ideas"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see the table on [`ApiError`]).
    pub code: u32,
    /// Human-readable message, shown verbatim by the UI.
    pub message: String,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category              | HTTP Status                   |
/// |-----------|-----------------------|-------------------------------|
/// | 1000–1999 | Validation / workflow | 400 Bad Request               |
/// | 2000–2999 | Identity / lookup     | 401 Unauthorized / 404        |
/// | 3000–3999 | Server                | 500 / 503                     |
/// | 4029      | Throttling            | 429 Too Many Requests         |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Input failed shape or length validation.
    #[error("{0}")]
    Validation(String),

    /// Lifecycle precondition violated; the message names the required
    /// source state.
    #[error("{0}")]
    InvalidTransition(String),

    /// The target is in a state that does not accept the operation.
    #[error("{0}")]
    InvalidState(String),

    /// No verified identity on the request.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Identity present but lacking the admin role.
    #[error("Admin access required")]
    AuthorizationDenied,

    /// The referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Client exceeded a rate limit.
    #[error("Too many requests; retry after {retry_after_secs} s")]
    RateLimited {
        /// Seconds until the current window resets.
        retry_after_secs: u64,
    },

    /// The data tier is not configured or unreachable.
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::InvalidTransition(_) => 1002,
            Self::InvalidState(_) => 1003,
            Self::AuthenticationRequired => 2001,
            Self::AuthorizationDenied => 2002,
            Self::NotFound(_) => 2004,
            Self::Internal(_) => 3000,
            Self::Persistence(_) => 3001,
            Self::ServiceUnavailable(_) => 3003,
            Self::RateLimited { .. } => 4029,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidTransition(_) | Self::InvalidState(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::AuthenticationRequired | Self::AuthorizationDenied => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Shorthand for the degraded-mode error returned when no store is
    /// configured.
    #[must_use]
    pub fn store_disabled() -> Self {
        Self::ServiceUnavailable(
            "Database not configured - this feature is temporarily disabled".to_string(),
        )
    }

    /// Message sent to the client. Server-side details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::Persistence(_) | Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.public_message(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        if let Self::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn workflow_errors_are_bad_request() {
        let err = ApiError::InvalidTransition("Can only approve pending ideas".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Can only approve pending ideas");
        assert_eq!(
            ApiError::InvalidState("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn rate_limited_sets_retry_after() {
        let response = ApiError::RateLimited {
            retry_after_secs: 42,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let Some(value) = response.headers().get(header::RETRY_AFTER) else {
            panic!("missing Retry-After");
        };
        assert_eq!(value, "42");
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let err = ApiError::Persistence("relation \"ideas\" does not exist".to_string());
        assert_eq!(err.public_message(), "Internal server error");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn body_carries_code_and_message_only() {
        let response = ApiError::Validation("Title is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body should read");
        };
        let Ok(json) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
            panic!("body should be JSON");
        };
        assert_eq!(
            json,
            serde_json::json!({"error": {"code": 1001, "message": "Title is required"}})
        );
    }

    #[test]
    fn disabled_store_is_service_unavailable() {
        let err = ApiError::store_disabled();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.to_string().contains("temporarily disabled"));
    }

    #[test]
    fn not_found_names_the_entity() {
        assert_eq!(ApiError::NotFound("Idea").to_string(), "Idea not found");
        assert_eq!(ApiError::NotFound("Idea").status_code(), StatusCode::NOT_FOUND);
    }
}
