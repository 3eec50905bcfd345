//! Refresh-token lifecycle
//!
//! Refresh tokens are opaque: 32 cryptographically random bytes, hex-encoded,
//! with no structure for a client to inspect. Only a SHA-256 hash is stored,
//! on the owning user's row, together with an absolute expiry (7 days by
//! default). Issuing overwrites whatever was there, so a user holds at most
//! one live refresh token: logging in on a second device invalidates the
//! first. Multi-device sessions would need a separate sessions table; the
//! single-slot model is kept deliberately.
//!
//! Token states: Active (stored, unexpired) -> Rotated (overwritten by a
//! newer issue) or Expired. Both end states are terminal; a fresh issue is
//! logically a new token.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::core::db::models::User;
use crate::core::db::repositories::{UserRepository, UserRepositoryError};
use uuid::Uuid;

/// Refresh-token bytes before hex encoding
const REFRESH_TOKEN_BYTES: usize = 32;

/// Default refresh token lifetime (7 days)
const REFRESH_TOKEN_EXPIRATION_DAYS: i64 = 7;

/// Refresh-token errors
#[derive(Debug, thiserror::Error)]
pub enum RefreshTokenError {
    /// No match, stored value differs, or the token has expired. One variant
    /// for all three so callers cannot tell a revoked token from a forged one.
    #[error("Invalid refresh token")]
    Invalid,

    #[error(transparent)]
    Repository(#[from] UserRepositoryError),
}

/// A freshly issued refresh token: the raw value goes to the client, the
/// expiry goes into the cookie's Max-Age
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Manages issue, rotation, and revocation of refresh tokens
#[derive(Clone)]
pub struct RefreshTokenManager {
    user_repo: UserRepository,
    expiration_days: i64,
}

impl RefreshTokenManager {
    /// Create a manager with the default 7-day lifetime
    pub fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            expiration_days: REFRESH_TOKEN_EXPIRATION_DAYS,
        }
    }

    /// Set the token lifetime in days
    pub fn expiration_days(mut self, days: i64) -> Self {
        self.expiration_days = days;
        self
    }

    /// Generate an opaque token value from the OS RNG
    pub fn generate_token() -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Hash a token for at-rest storage
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Issue a new refresh token for a user, overwriting any previous one
    pub async fn issue(&self, user_id: Uuid) -> Result<IssuedRefreshToken, RefreshTokenError> {
        let token = Self::generate_token();
        let expires_at = Utc::now() + Duration::days(self.expiration_days);

        self.user_repo
            .set_refresh_token(user_id, &Self::hash_token(&token), expires_at)
            .await?;

        Ok(IssuedRefreshToken { token, expires_at })
    }

    /// Validate a presented token and rotate it.
    ///
    /// Fails with [`RefreshTokenError::Invalid`] when no user holds the
    /// token, when the stored value no longer matches (rotated out from
    /// under us between fetch and compare), or when the expiry has passed.
    /// On success the stored value is immediately replaced, so the presented
    /// token can never authenticate twice.
    pub async fn validate_and_rotate(
        &self,
        presented: &str,
    ) -> Result<(User, IssuedRefreshToken), RefreshTokenError> {
        let presented_hash = Self::hash_token(presented);

        let user = self
            .user_repo
            .find_by_refresh_token_hash(&presented_hash)
            .await?
            .ok_or(RefreshTokenError::Invalid)?;

        // Re-compare against the fetched row
        match &user.refresh_token_hash {
            Some(stored) if *stored == presented_hash => {}
            _ => return Err(RefreshTokenError::Invalid),
        }

        match user.refresh_token_expires_at {
            Some(expires_at) if Utc::now() < expires_at => {}
            _ => {
                tracing::debug!(user_id = %user.id, "refresh token presented after expiry");
                return Err(RefreshTokenError::Invalid);
            }
        }

        let rotated = self.issue(user.id).await?;
        Ok((user, rotated))
    }

    /// Revoke the user's refresh token (logout)
    pub async fn revoke(&self, user_id: Uuid) -> Result<(), RefreshTokenError> {
        self.user_repo.clear_refresh_token(user_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Token Generation Tests (don't require database)
    // ========================================================================

    #[test]
    fn test_generate_token_is_64_hex_chars() {
        let token = RefreshTokenManager::generate_token();

        // 32 bytes = 64 hex characters
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_token_values_differ() {
        let token1 = RefreshTokenManager::generate_token();
        let token2 = RefreshTokenManager::generate_token();

        assert_ne!(token1, token2);
    }

    #[test]
    fn test_hash_token_is_deterministic() {
        let token = "some_refresh_token";

        assert_eq!(
            RefreshTokenManager::hash_token(token),
            RefreshTokenManager::hash_token(token)
        );
    }

    #[test]
    fn test_hash_token_differs_per_token() {
        assert_ne!(
            RefreshTokenManager::hash_token("token_one"),
            RefreshTokenManager::hash_token("token_two")
        );
    }

    #[test]
    fn test_hash_token_is_64_hex_chars() {
        let hash = RefreshTokenManager::hash_token("anything");

        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_refresh_token_error_display() {
        assert_eq!(
            format!("{}", RefreshTokenError::Invalid),
            "Invalid refresh token"
        );
    }

    // ========================================================================
    // Integration Tests (require database)
    // ========================================================================

    async fn setup_manager() -> (RefreshTokenManager, UserRepository, Uuid, sqlx::PgPool) {
        use crate::core::db::models::{CreateUser, roles};
        use crate::core::db::pool::{DbConfig, create_pool};

        let config = DbConfig::from_env().expect("DATABASE_URL must be set for tests");
        let pool = create_pool(&config)
            .await
            .expect("Failed to create test pool");
        let user_repo = UserRepository::new(pool.clone());

        let user = user_repo
            .create(&CreateUser {
                name: "Rotator".to_string(),
                email: format!("rotate_{}@example.com", Uuid::new_v4()),
                password_hash: "test_hash".to_string(),
                role: roles::USER.to_string(),
            })
            .await
            .expect("Failed to create test user");

        (
            RefreshTokenManager::new(user_repo.clone()),
            user_repo,
            user.id,
            pool,
        )
    }

    async fn cleanup(user_repo: &UserRepository, user_id: Uuid) {
        user_repo.delete(user_id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_issue_then_validate_succeeds_once() {
        let (manager, user_repo, user_id, _pool) = setup_manager().await;

        let issued = manager.issue(user_id).await.unwrap();

        let (user, _rotated) = manager.validate_and_rotate(&issued.token).await.unwrap();
        assert_eq!(user.id, user_id);

        // The now-rotated token must not authenticate again
        let replay = manager.validate_and_rotate(&issued.token).await;
        assert!(matches!(replay, Err(RefreshTokenError::Invalid)));

        cleanup(&user_repo, user_id).await;
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_second_issue_invalidates_first() {
        let (manager, user_repo, user_id, _pool) = setup_manager().await;

        let first = manager.issue(user_id).await.unwrap();
        let second = manager.issue(user_id).await.unwrap();
        assert_ne!(first.token, second.token);

        let stale = manager.validate_and_rotate(&first.token).await;
        assert!(matches!(stale, Err(RefreshTokenError::Invalid)));

        let (user, _) = manager.validate_and_rotate(&second.token).await.unwrap();
        assert_eq!(user.id, user_id);

        cleanup(&user_repo, user_id).await;
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_expired_token_rejected_not_rotated() {
        let (manager, user_repo, user_id, _pool) = setup_manager().await;

        let issued = manager.issue(user_id).await.unwrap();

        // Push the expiry into the past while keeping the same token
        user_repo
            .set_refresh_token(
                user_id,
                &RefreshTokenManager::hash_token(&issued.token),
                Utc::now() - Duration::seconds(1),
            )
            .await
            .unwrap();

        let result = manager.validate_and_rotate(&issued.token).await;
        assert!(matches!(result, Err(RefreshTokenError::Invalid)));

        // Still stored: an expired token is rejected, not consumed
        let user = user_repo.find_by_id(user_id).await.unwrap().unwrap();
        assert!(user.refresh_token_hash.is_some());

        cleanup(&user_repo, user_id).await;
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_revoke_clears_token() {
        let (manager, user_repo, user_id, _pool) = setup_manager().await;

        let issued = manager.issue(user_id).await.unwrap();
        manager.revoke(user_id).await.unwrap();

        let result = manager.validate_and_rotate(&issued.token).await;
        assert!(matches!(result, Err(RefreshTokenError::Invalid)));

        cleanup(&user_repo, user_id).await;
    }
}
