/// Session issuing.
///
/// Orchestrates the password hasher, the token codec, and the user store to
/// produce register / login / refresh / change-password outcomes. Every
/// failure is a typed result; the transport layer maps it to a status code.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::claims::RefreshClaims;
use crate::auth::password::{hash_password, password_match};
use crate::auth::token::TokenCodec;
use crate::error::{AppError, AuthError, DatabaseError, TokenError};
use crate::users::UserStore;

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct SessionIssuer {
    store: Arc<dyn UserStore>,
    codec: TokenCodec,
}

impl SessionIssuer {
    pub fn new(store: Arc<dyn UserStore>, codec: TokenCodec) -> Self {
        Self { store, codec }
    }

    /// Register a new user and log them in.
    ///
    /// Uniqueness is the storage layer's job: a duplicate-key conflict on
    /// the email column comes back as `EmailTaken`, so concurrent identical
    /// registrations cannot race past an existence check.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionTokens, AppError> {
        let password_hash = hash_password(password)?;

        let user = match self.store.create(name, email, &password_hash).await {
            Ok(user) => user,
            Err(AppError::Database(DatabaseError::UniqueConstraintViolation(_))) => {
                return Err(AuthError::EmailTaken.into());
            }
            Err(e) => return Err(e),
        };

        tracing::info!(user_id = %user.id, "User registered");
        self.mint(user.id, user.token_version)
    }

    /// Authenticate with email and password and mint a token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionTokens, AppError> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !password_match(&user.password_hash, password) {
            return Err(AuthError::InvalidCredentials.into());
        }

        tracing::info!(user_id = %user.id, "User logged in");
        self.mint(user.id, user.token_version)
    }

    /// Exchange a refresh token for a fresh access/refresh pair.
    ///
    /// The claims' version counter must equal the user's live counter; a
    /// mismatch means the token was revoked by a password change. The old
    /// refresh token is not blacklisted and stays valid until its own
    /// expiry.
    pub async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, AppError> {
        let claims: RefreshClaims = self.codec.parse(refresh_token).map_err(|e| match e {
            TokenError::Malformed => AppError::Token(TokenError::Malformed),
            _ => AppError::Auth(AuthError::Unauthorized),
        })?;

        let user_id = claims.user_id()?;
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.token_version != claims.token_version {
            tracing::warn!(user_id = %user.id, "Refresh with revoked token version");
            return Err(AuthError::Unauthorized.into());
        }

        self.mint(user.id, user.token_version)
    }

    /// Change the user's password and bump their token version.
    ///
    /// The hash and the incremented counter are persisted in one update; the
    /// bump revokes every refresh token issued before this moment.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !password_match(&user.password_hash, current_password) {
            return Err(AuthError::Unauthorized.into());
        }

        if current_password == new_password {
            return Err(AuthError::SameNewPassword.into());
        }

        let password_hash = hash_password(new_password)?;
        self.store
            .update_credentials(user.id, &password_hash, user.token_version + 1)
            .await?;

        tracing::info!(user_id = %user.id, "Password changed, refresh tokens revoked");
        Ok(())
    }

    fn mint(&self, user_id: Uuid, token_version: i32) -> Result<SessionTokens, AppError> {
        Ok(SessionTokens {
            access_token: self.codec.sign_access(user_id)?,
            refresh_token: self.codec.sign_refresh(user_id, token_version)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::AccessClaims;
    use crate::testutils::InMemoryUserStore;

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";
    const EMAIL: &str = "a@x.com";
    const PASSWORD: &str = "pw123456";

    fn issuer() -> (SessionIssuer, Arc<InMemoryUserStore>) {
        let store = Arc::new(InMemoryUserStore::new());
        let issuer = SessionIssuer::new(store.clone(), TokenCodec::new(SECRET));
        (issuer, store)
    }

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET)
    }

    #[tokio::test]
    async fn register_then_login() {
        let (issuer, _) = issuer();

        issuer.register("A", EMAIL, PASSWORD).await.unwrap();
        let tokens = issuer.login(EMAIL, PASSWORD).await.unwrap();

        let access: AccessClaims = codec().parse(&tokens.access_token).unwrap();
        let refresh: RefreshClaims = codec().parse(&tokens.refresh_token).unwrap();
        assert_eq!(access.sub, refresh.sub);
        assert_eq!(refresh.token_version, 0);
    }

    #[tokio::test]
    async fn register_existing_email_fails_without_mutating_the_store() {
        let (issuer, store) = issuer();

        issuer.register("A", EMAIL, PASSWORD).await.unwrap();
        let before = store.snapshot();

        let result = issuer.register("B", EMAIL, "otherpw123").await;
        match result {
            Err(AppError::Auth(AuthError::EmailTaken)) => (),
            other => panic!("expected EmailTaken, got {:?}", other),
        }

        let after = store.snapshot();
        assert_eq!(before.len(), after.len());
        assert_eq!(before[0].password_hash, after[0].password_hash);
        assert_eq!(before[0].token_version, after[0].token_version);
    }

    #[tokio::test]
    async fn login_unknown_email_is_user_not_found() {
        let (issuer, _) = issuer();

        let result = issuer.login("nobody@x.com", PASSWORD).await;
        match result {
            Err(AppError::Auth(AuthError::UserNotFound)) => (),
            other => panic!("expected UserNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn login_wrong_password_is_invalid_credentials() {
        let (issuer, _) = issuer();
        issuer.register("A", EMAIL, PASSWORD).await.unwrap();

        let result = issuer.login(EMAIL, "pw1234567").await;
        match result {
            Err(AppError::Auth(AuthError::InvalidCredentials)) => (),
            other => panic!("expected InvalidCredentials, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn refresh_returns_a_fresh_pair() {
        let (issuer, _) = issuer();
        let tokens = issuer.register("A", EMAIL, PASSWORD).await.unwrap();

        let renewed = issuer.refresh(&tokens.refresh_token).await.unwrap();
        assert!(codec().parse::<AccessClaims>(&renewed.access_token).is_ok());
        assert!(codec()
            .parse::<RefreshClaims>(&renewed.refresh_token)
            .is_ok());
    }

    #[tokio::test]
    async fn refresh_with_garbage_is_malformed() {
        let (issuer, _) = issuer();

        let result = issuer.refresh("not.a.token").await;
        match result {
            Err(AppError::Token(TokenError::Malformed)) => (),
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn refresh_with_foreign_signature_is_unauthorized() {
        let (issuer, _) = issuer();
        let tokens = issuer.register("A", EMAIL, PASSWORD).await.unwrap();

        // Re-sign the same claims under a different secret.
        let foreign = TokenCodec::new("another-secret-entirely-for-this-test");
        let claims: RefreshClaims = codec().parse(&tokens.refresh_token).unwrap();
        let forged = foreign
            .sign_refresh(claims.user_id().unwrap(), claims.token_version)
            .unwrap();

        let result = issuer.refresh(&forged).await;
        match result {
            Err(AppError::Auth(AuthError::Unauthorized)) => (),
            other => panic!("expected Unauthorized, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn refresh_for_a_deleted_user_is_user_not_found() {
        let (issuer, store) = issuer();
        let tokens = issuer.register("A", EMAIL, PASSWORD).await.unwrap();

        store.clear();

        let result = issuer.refresh(&tokens.refresh_token).await;
        match result {
            Err(AppError::Auth(AuthError::UserNotFound)) => (),
            other => panic!("expected UserNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn password_change_bumps_the_version_and_revokes_old_refresh_tokens() {
        let (issuer, store) = issuer();
        let old_tokens = issuer.register("A", EMAIL, PASSWORD).await.unwrap();
        let user_id = store.snapshot()[0].id;

        issuer
            .change_password(user_id, PASSWORD, "newpw12345")
            .await
            .unwrap();

        assert_eq!(store.snapshot()[0].token_version, 1);

        // A refresh token minted before the change is now revoked.
        let result = issuer.refresh(&old_tokens.refresh_token).await;
        match result {
            Err(AppError::Auth(AuthError::Unauthorized)) => (),
            other => panic!("expected Unauthorized, got {:?}", other),
        }

        // One minted after the change works.
        let new_tokens = issuer.login(EMAIL, "newpw12345").await.unwrap();
        assert!(issuer.refresh(&new_tokens.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn change_password_with_wrong_current_is_unauthorized() {
        let (issuer, store) = issuer();
        issuer.register("A", EMAIL, PASSWORD).await.unwrap();
        let user_id = store.snapshot()[0].id;

        let result = issuer
            .change_password(user_id, "wrongcurrent", "newpw12345")
            .await;
        match result {
            Err(AppError::Auth(AuthError::Unauthorized)) => (),
            other => panic!("expected Unauthorized, got {:?}", other),
        }
        assert_eq!(store.snapshot()[0].token_version, 0);
    }

    #[tokio::test]
    async fn change_password_to_the_same_password_is_rejected_untouched() {
        let (issuer, store) = issuer();
        issuer.register("A", EMAIL, PASSWORD).await.unwrap();
        let before = store.snapshot();

        let result = issuer
            .change_password(before[0].id, PASSWORD, PASSWORD)
            .await;
        match result {
            Err(AppError::Auth(AuthError::SameNewPassword)) => (),
            other => panic!("expected SameNewPassword, got {:?}", other),
        }

        let after = store.snapshot();
        assert_eq!(before[0].password_hash, after[0].password_hash);
        assert_eq!(before[0].token_version, after[0].token_version);
    }
}
