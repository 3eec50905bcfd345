//! Celestial-system repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::{CelestialSystem, CreateCelestialSystem, UpdateCelestialSystem};

/// Celestial-system repository error types
#[derive(Debug, thiserror::Error)]
pub enum SystemRepositoryError {
    #[error("Celestial system not found")]
    NotFound,

    #[error("A system with this name already exists")]
    NameAlreadyExists,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Repository over the `celestial_systems` table
#[derive(Clone)]
pub struct SystemRepository {
    pool: PgPool,
}

impl SystemRepository {
    /// Create a new system repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a celestial system
    pub async fn create(
        &self,
        dto: &CreateCelestialSystem,
    ) -> Result<CelestialSystem, SystemRepositoryError> {
        if self.find_by_name(&dto.name).await?.is_some() {
            return Err(SystemRepositoryError::NameAlreadyExists);
        }

        let system = sqlx::query_as::<_, CelestialSystem>(
            r#"
            INSERT INTO celestial_systems (name, description, distance_light_years)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, distance_light_years, created_at, updated_at
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(dto.distance_light_years)
        .fetch_one(&self.pool)
        .await?;

        Ok(system)
    }

    /// Find a system by ID
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<CelestialSystem>, SystemRepositoryError> {
        let system = sqlx::query_as::<_, CelestialSystem>(
            r#"
            SELECT id, name, description, distance_light_years, created_at, updated_at
            FROM celestial_systems
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(system)
    }

    /// Find a system by name
    pub async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<CelestialSystem>, SystemRepositoryError> {
        let system = sqlx::query_as::<_, CelestialSystem>(
            r#"
            SELECT id, name, description, distance_light_years, created_at, updated_at
            FROM celestial_systems
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(system)
    }

    /// List systems alphabetically
    pub async fn list(&self) -> Result<Vec<CelestialSystem>, SystemRepositoryError> {
        let systems = sqlx::query_as::<_, CelestialSystem>(
            r#"
            SELECT id, name, description, distance_light_years, created_at, updated_at
            FROM celestial_systems
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(systems)
    }

    /// Apply a partial update
    pub async fn update(
        &self,
        id: Uuid,
        updates: &UpdateCelestialSystem,
    ) -> Result<CelestialSystem, SystemRepositoryError> {
        if let Some(ref name) = updates.name
            && let Some(existing) = self.find_by_name(name).await?
            && existing.id != id
        {
            return Err(SystemRepositoryError::NameAlreadyExists);
        }

        let system = sqlx::query_as::<_, CelestialSystem>(
            r#"
            UPDATE celestial_systems
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                distance_light_years = COALESCE($4, distance_light_years)
            WHERE id = $1
            RETURNING id, name, description, distance_light_years, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&updates.name)
        .bind(&updates.description)
        .bind(updates.distance_light_years)
        .fetch_optional(&self.pool)
        .await?;

        system.ok_or(SystemRepositoryError::NotFound)
    }

    /// Delete a system (planets and satellites cascade)
    pub async fn delete(&self, id: Uuid) -> Result<bool, SystemRepositoryError> {
        let result = sqlx::query("DELETE FROM celestial_systems WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
