//! Signed session cookies.
//!
//! A session token is `base64url(claims_json) "." base64url(hmac_sha256)`.
//! The identity provider in front of the site issues tokens with the
//! shared secret; this service only verifies them (and issues them itself
//! for the development login).

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

type HmacSha256 = Hmac<Sha256>;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    /// Verified email of the caller.
    pub email: String,
    /// Display name, if known.
    #[serde(default)]
    pub name: Option<String>,
    /// Expiry as milliseconds since the Unix epoch.
    pub expires_at: i64,
}

impl SessionClaims {
    /// Builds claims for `email` valid for `ttl` from `now`. The email is
    /// trimmed and lower-cased; an expiry past the calendar limit saturates.
    #[must_use]
    pub fn new(email: &str, name: Option<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            email: email.trim().to_lowercase(),
            name,
            expires_at: now
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .timestamp_millis(),
        }
    }

    /// Returns `true` once `now` is past the expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() > self.expires_at
    }
}

/// Why a token was not accepted. Callers treat every case as anonymous.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Not two base64url segments separated by a dot.
    #[error("malformed session token")]
    Malformed,
    /// Signature does not match the payload.
    #[error("bad session signature")]
    BadSignature,
    /// Claims are past their expiry.
    #[error("session expired")]
    Expired,
}

/// Signs and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct SessionCodec {
    mac: HmacSha256,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec").finish_non_exhaustive()
    }
}

impl SessionCodec {
    /// Creates a codec for `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`hmac::digest::InvalidLength`] if the key is rejected by
    /// the MAC.
    pub fn new(secret: &str) -> Result<Self, hmac::digest::InvalidLength> {
        Ok(Self {
            mac: <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())?,
        })
    }

    /// Serializes and signs `claims`.
    #[must_use]
    pub fn encode(&self, claims: &SessionClaims) -> String {
        let payload = serde_json::to_vec(claims).unwrap_or_default();
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(payload_b64.as_bytes()));
        format!("{payload_b64}.{signature}")
    }

    /// Verifies `token` and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] when the token is malformed, its
    /// signature does not verify, or it has expired at `now`.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, SessionError> {
        let (payload_b64, signature_b64) = token.split_once('.').ok_or(SessionError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| SessionError::Malformed)?;

        let mut mac = self.mac.clone();
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| SessionError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| SessionError::Malformed)?;
        let claims: SessionClaims =
            serde_json::from_slice(&payload).map_err(|_| SessionError::Malformed)?;

        if claims.is_expired(now) {
            return Err(SessionError::Expired);
        }
        Ok(claims)
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn codec(secret: &str) -> SessionCodec {
        let Ok(codec) = SessionCodec::new(secret) else {
            panic!("any key length is accepted");
        };
        codec
    }

    fn claims(now: DateTime<Utc>) -> SessionClaims {
        SessionClaims::new(" U1@X.com ", Some("U One".to_string()), now, Duration::hours(24))
    }

    #[test]
    fn round_trip_normalizes_email() {
        let codec = codec("secret");
        let now = Utc::now();
        let token = codec.encode(&claims(now));
        let Ok(decoded) = codec.decode(&token, now) else {
            panic!("token should verify");
        };
        assert_eq!(decoded.email, "u1@x.com");
        assert_eq!(decoded.name.as_deref(), Some("U One"));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let now = Utc::now();
        let token = codec("secret").encode(&claims(now));
        assert_eq!(
            codec("other").decode(&token, now),
            Err(SessionError::BadSignature)
        );
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = codec("secret");
        let now = Utc::now();
        let token = codec.encode(&claims(now));
        let Some((_, signature)) = token.split_once('.') else {
            panic!("token has two segments");
        };
        let forged_claims = SessionClaims::new("admin@x.com", None, now, Duration::hours(1));
        let forged_payload =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap_or_default());
        let forged = format!("{forged_payload}.{signature}");
        assert_eq!(codec.decode(&forged, now), Err(SessionError::BadSignature));
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec("secret");
        let issued = Utc::now() - Duration::hours(25);
        let token = codec.encode(&claims(issued));
        assert_eq!(codec.decode(&token, Utc::now()), Err(SessionError::Expired));
    }

    #[test]
    fn huge_ttl_saturates_instead_of_overflowing() {
        let claims = SessionClaims::new("u1@x.com", None, Utc::now(), Duration::MAX);
        assert_eq!(claims.expires_at, DateTime::<Utc>::MAX_UTC.timestamp_millis());
        assert!(!claims.is_expired(Utc::now()));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec("secret");
        assert_eq!(codec.decode("no-dot", Utc::now()), Err(SessionError::Malformed));
        assert_eq!(codec.decode("a.!!!", Utc::now()), Err(SessionError::Malformed));
    }
}
