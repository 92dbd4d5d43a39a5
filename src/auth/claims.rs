/// Claim payloads for the two session token kinds.
///
/// Both shapes are fixed at compile time; the codec's `parse` selects the
/// shape through its type parameter. Claims are built at issue time, never
/// mutated, and expire on their own.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TokenError;

/// Access token lifetime in seconds (5 minutes).
///
/// Access tokens carry no version counter, so a password change does not cut
/// them off; this window bounds how long a revoked session can keep going.
pub const ACCESS_TOKEN_AGE: i64 = 300;

/// Refresh token lifetime in seconds (1 month, not calendar-exact).
pub const REFRESH_TOKEN_AGE: i64 = 2_628_000;

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject (user id as UUID string)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    pub fn new(user_id: Uuid) -> Self {
        Self::with_age(user_id, ACCESS_TOKEN_AGE)
    }

    pub(crate) fn with_age(user_id: Uuid, age_seconds: i64) -> Self {
        Self {
            sub: user_id.to_string(),
            exp: chrono::Utc::now().timestamp() + age_seconds,
        }
    }

    /// Extract the user id from the subject claim.
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Malformed)
    }
}

/// Claims carried by a refresh token.
///
/// The version counter is checked against the user record on every refresh;
/// a mismatch means the token was revoked by a password change.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    /// Subject (user id as UUID string)
    pub sub: String,
    /// Per-user revocation counter at issue time
    pub token_version: i32,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl RefreshClaims {
    pub fn new(user_id: Uuid, token_version: i32) -> Self {
        Self::with_age(user_id, token_version, REFRESH_TOKEN_AGE)
    }

    pub(crate) fn with_age(user_id: Uuid, token_version: i32, age_seconds: i64) -> Self {
        Self {
            sub: user_id.to_string(),
            token_version,
            exp: chrono::Utc::now().timestamp() + age_seconds,
        }
    }

    /// Extract the user id from the subject claim.
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Malformed)
    }
}
