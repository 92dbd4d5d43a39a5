/// Token signing and parsing.
///
/// One codec instance holds the key material derived from the configured
/// secret; it is built once at startup and shared read-only. Signing and
/// parsing use the same secret, so rotating it invalidates every
/// outstanding token.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::claims::{AccessClaims, RefreshClaims};
use crate::error::{AppError, TokenError};

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No clock leeway: a token is expired the second its exp passes.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Mint an access token for the user.
    pub fn sign_access(&self, user_id: Uuid) -> Result<String, AppError> {
        self.sign(&AccessClaims::new(user_id))
    }

    /// Mint a refresh token bound to the user's current token version.
    pub fn sign_refresh(&self, user_id: Uuid, token_version: i32) -> Result<String, AppError> {
        self.sign(&RefreshClaims::new(user_id, token_version))
    }

    fn sign<C: Serialize>(&self, claims: &C) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("token signing failed: {}", e)))
    }

    /// Verify a token and decode its claims.
    ///
    /// The claims shape is selected by the caller's type parameter
    /// (`AccessClaims` or `RefreshClaims`).
    pub fn parse<C: DeserializeOwned>(&self, token: &str) -> Result<C, TokenError> {
        decode::<C>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })
    }
}
