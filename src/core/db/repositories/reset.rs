//! Password-reset code repository
//!
//! At most one reset row per user. Unlike verification tokens (which are
//! deleted and re-inserted), a re-request overwrites the code and expiry in
//! place with a single upsert, so there is no window with zero rows and no
//! duplicate rows under concurrent requests.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::PasswordResetToken;

/// Reset token repository error types
#[derive(Debug, thiserror::Error)]
pub enum ResetRepositoryError {
    #[error("Reset token not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Repository over the `password_reset_tokens` table
#[derive(Clone)]
pub struct ResetTokenRepository {
    pool: PgPool,
}

impl ResetTokenRepository {
    /// Create a new reset token repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the user's reset code, or overwrite token and expiry in place
    /// if a row already exists.
    pub async fn upsert(
        &self,
        user_id: Uuid,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PasswordResetToken, ResetRepositoryError> {
        let record = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            INSERT INTO password_reset_tokens (user_id, email, token, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id)
            DO UPDATE SET token = EXCLUDED.token, expires_at = EXCLUDED.expires_at
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

    /// Find the reset row for a user
    pub async fn find_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PasswordResetToken>, ResetRepositoryError> {
        let record = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            SELECT user_id, email, token, expires_at
            FROM password_reset_tokens
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Delete the row for a user (consumption)
    pub async fn delete_for_user(&self, user_id: Uuid) -> Result<bool, ResetRepositoryError> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove expired rows (periodic sweep)
    pub async fn cleanup_expired(&self) -> Result<u64, ResetRepositoryError> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_repository_error_display() {
        assert_eq!(
            format!("{}", ResetRepositoryError::NotFound),
            "Reset token not found"
        );
    }

    // ========================================================================
    // Integration Tests (require database)
    // ========================================================================

    async fn setup_test_user() -> (PgPool, Uuid) {
        use crate::core::db::pool::{DbConfig, create_pool};

        let config = DbConfig::from_env().expect("DATABASE_URL must be set for tests");
        let pool = create_pool(&config)
            .await
            .expect("Failed to create test pool");

        let user_id = Uuid::new_v4();
        let email = format!("reset_{}@example.com", user_id);
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role)
            VALUES ($1, 'Reset Test', $2, 'test_hash', 'User')
            "#,
        )
        .bind(user_id)
        .bind(&email)
        .execute(&pool)
        .await
        .expect("Failed to create test user");

        (pool, user_id)
    }

    async fn cleanup_test_user(pool: &PgPool, user_id: Uuid) {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(pool)
            .await
            .expect("Failed to cleanup test user");
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_upsert_overwrites_in_place() {
        let (pool, user_id) = setup_test_user().await;
        let repo = ResetTokenRepository::new(pool.clone());
        let email = format!("reset_{}@example.com", user_id);

        let first_expiry = Utc::now() + chrono::Duration::minutes(10);
        repo.upsert(user_id, &email, "A1B2C3", first_expiry)
            .await
            .unwrap();

        let second_expiry = Utc::now() + chrono::Duration::minutes(10);
        repo.upsert(user_id, &email, "D4E5F6", second_expiry)
            .await
            .unwrap();

        // Exactly one row, carrying the newest code
        let row = repo.find_by_user(user_id).await.unwrap().unwrap();
        assert_eq!(row.token, "D4E5F6");

        cleanup_test_user(&pool, user_id).await;
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_delete_for_user_consumes_code() {
        let (pool, user_id) = setup_test_user().await;
        let repo = ResetTokenRepository::new(pool.clone());
        let email = format!("reset_{}@example.com", user_id);

        repo.upsert(
            user_id,
            &email,
            "G7H8I9",
            Utc::now() + chrono::Duration::minutes(10),
        )
        .await
        .unwrap();

        assert!(repo.delete_for_user(user_id).await.unwrap());
        assert!(repo.find_by_user(user_id).await.unwrap().is_none());

        cleanup_test_user(&pool, user_id).await;
    }
}
