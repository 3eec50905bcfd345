//! Email-verification token repository
//!
//! One active token per user: issuing a new token deletes the previous row
//! first, so only the most recent link can verify. Consumption deletes the
//! row, which is what makes the token single-use. Expired rows are left in
//! place for the periodic sweep rather than purged on the failed attempt.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::EmailVerificationToken;

/// Verification token repository error types
#[derive(Debug, thiserror::Error)]
pub enum VerificationRepositoryError {
    #[error("Verification token not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Repository over the `email_verification_tokens` table
#[derive(Clone)]
pub struct VerificationTokenRepository {
    pool: PgPool,
}

impl VerificationTokenRepository {
    /// Create a new verification token repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Replace the user's verification token: delete any existing row, then
    /// insert a fresh one.
    ///
    /// The two statements are not wrapped in a transaction; concurrent
    /// replacements for the same user can interleave. Acceptable here since
    /// the loser's link simply fails as invalid.
    pub async fn replace(
        &self,
        user_id: Uuid,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<EmailVerificationToken, VerificationRepositoryError> {
        self.delete_for_user(user_id).await?;

        let record = sqlx::query_as::<_, EmailVerificationToken>(
            r#"
            INSERT INTO email_verification_tokens (user_id, email, token, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING user_id, email, token, expires_at
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(token)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Find the row matching exactly this email and token
    pub async fn find_by_email_and_token(
        &self,
        email: &str,
        token: &str,
    ) -> Result<Option<EmailVerificationToken>, VerificationRepositoryError> {
        let record = sqlx::query_as::<_, EmailVerificationToken>(
            r#"
            SELECT user_id, email, token, expires_at
            FROM email_verification_tokens
            WHERE email = $1 AND token = $2
            "#,
        )
        .bind(email)
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Delete the row for a user (consumption or replacement)
    pub async fn delete_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<bool, VerificationRepositoryError> {
        let result = sqlx::query("DELETE FROM email_verification_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove expired rows (periodic sweep)
    pub async fn cleanup_expired(&self) -> Result<u64, VerificationRepositoryError> {
        let result = sqlx::query("DELETE FROM email_verification_tokens WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
