//! Identity and profile DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Identity, UserProfile};

/// Response body for `GET /auth/me` and `POST /auth/login`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    /// The caller, or `null` when anonymous.
    pub user: Option<Identity>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email to sign in as.
    #[serde(default)]
    pub email: String,
    /// Display name; defaults to the email's local part.
    #[serde(default)]
    pub name: Option<String>,
}

/// Response body for `POST /auth/logout`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LogoutResponse {
    /// Always `true`.
    pub success: bool,
}

/// Response body for the profile endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    /// The caller's profile.
    pub profile: UserProfile,
}

/// Request body for `PUT /user/profile`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// Given name, at most 50 characters.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name, at most 50 characters.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Bio, at most 500 characters.
    #[serde(default)]
    pub bio: Option<String>,
}
