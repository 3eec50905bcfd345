//! Planet repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::{CreatePlanet, Planet, UpdatePlanet};

/// Planet repository error types
#[derive(Debug, thiserror::Error)]
pub enum PlanetRepositoryError {
    #[error("Planet not found")]
    NotFound,

    #[error("Celestial system not found")]
    SystemNotFound,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Repository over the `planets` table
#[derive(Clone)]
pub struct PlanetRepository {
    pool: PgPool,
}

impl PlanetRepository {
    /// Create a new planet repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a planet within a system
    pub async fn create(&self, dto: &CreatePlanet) -> Result<Planet, PlanetRepositoryError> {
        let planet = sqlx::query_as::<_, Planet>(
            r#"
            INSERT INTO planets (system_id, name, description, radius_km, orbital_period_days, texture_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, system_id, name, description, radius_km, orbital_period_days,
                      texture_url, created_at, updated_at
            "#,
        )
        .bind(dto.system_id)
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(dto.radius_km)
        .bind(dto.orbital_period_days)
        .bind(&dto.texture_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            // FK violation on system_id
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                PlanetRepositoryError::SystemNotFound
            }
            _ => PlanetRepositoryError::DatabaseError(e),
        })?;

        Ok(planet)
    }

    /// Find a planet by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Planet>, PlanetRepositoryError> {
        let planet = sqlx::query_as::<_, Planet>(
            r#"
            SELECT id, system_id, name, description, radius_km, orbital_period_days,
                   texture_url, created_at, updated_at
            FROM planets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(planet)
    }

    /// List all planets
    pub async fn list(&self) -> Result<Vec<Planet>, PlanetRepositoryError> {
        let planets = sqlx::query_as::<_, Planet>(
            r#"
            SELECT id, system_id, name, description, radius_km, orbital_period_days,
                   texture_url, created_at, updated_at
            FROM planets
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(planets)
    }

    /// List the planets of a system, explicitly scoped at the call site
    pub async fn list_by_system(
        &self,
        system_id: Uuid,
    ) -> Result<Vec<Planet>, PlanetRepositoryError> {
        let planets = sqlx::query_as::<_, Planet>(
            r#"
            SELECT id, system_id, name, description, radius_km, orbital_period_days,
                   texture_url, created_at, updated_at
            FROM planets
            WHERE system_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(system_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(planets)
    }

    /// Apply a partial update
    pub async fn update(
        &self,
        id: Uuid,
        updates: &UpdatePlanet,
    ) -> Result<Planet, PlanetRepositoryError> {
        let planet = sqlx::query_as::<_, Planet>(
            r#"
            UPDATE planets
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                radius_km = COALESCE($4, radius_km),
                orbital_period_days = COALESCE($5, orbital_period_days),
                texture_url = COALESCE($6, texture_url)
            WHERE id = $1
            RETURNING id, system_id, name, description, radius_km, orbital_period_days,
                      texture_url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&updates.name)
        .bind(&updates.description)
        .bind(updates.radius_km)
        .bind(updates.orbital_period_days)
        .bind(&updates.texture_url)
        .fetch_optional(&self.pool)
        .await?;

        planet.ok_or(PlanetRepositoryError::NotFound)
    }

    /// Delete a planet (satellites cascade)
    pub async fn delete(&self, id: Uuid) -> Result<bool, PlanetRepositoryError> {
        let result = sqlx::query("DELETE FROM planets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
