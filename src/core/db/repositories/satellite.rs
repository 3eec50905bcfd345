//! Satellite repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::{CreateSatellite, Satellite, UpdateSatellite};

/// Satellite repository error types
#[derive(Debug, thiserror::Error)]
pub enum SatelliteRepositoryError {
    #[error("Satellite not found")]
    NotFound,

    #[error("Planet not found")]
    PlanetNotFound,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Repository over the `satellites` table
#[derive(Clone)]
pub struct SatelliteRepository {
    pool: PgPool,
}

impl SatelliteRepository {
    /// Create a new satellite repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a satellite orbiting a planet
    pub async fn create(
        &self,
        dto: &CreateSatellite,
    ) -> Result<Satellite, SatelliteRepositoryError> {
        let satellite = sqlx::query_as::<_, Satellite>(
            r#"
            INSERT INTO satellites (planet_id, name, description, radius_km, orbital_period_days)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, planet_id, name, description, radius_km, orbital_period_days,
                      created_at, updated_at
            "#,
        )
        .bind(dto.planet_id)
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(dto.radius_km)
        .bind(dto.orbital_period_days)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                SatelliteRepositoryError::PlanetNotFound
            }
            _ => SatelliteRepositoryError::DatabaseError(e),
        })?;

        Ok(satellite)
    }

    /// Find a satellite by ID
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Satellite>, SatelliteRepositoryError> {
        let satellite = sqlx::query_as::<_, Satellite>(
            r#"
            SELECT id, planet_id, name, description, radius_km, orbital_period_days,
                   created_at, updated_at
            FROM satellites
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(satellite)
    }

    /// List all satellites
    pub async fn list(&self) -> Result<Vec<Satellite>, SatelliteRepositoryError> {
        let satellites = sqlx::query_as::<_, Satellite>(
            r#"
            SELECT id, planet_id, name, description, radius_km, orbital_period_days,
                   created_at, updated_at
            FROM satellites
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(satellites)
    }

    /// List the satellites of a planet
    pub async fn list_by_planet(
        &self,
        planet_id: Uuid,
    ) -> Result<Vec<Satellite>, SatelliteRepositoryError> {
        let satellites = sqlx::query_as::<_, Satellite>(
            r#"
            SELECT id, planet_id, name, description, radius_km, orbital_period_days,
                   created_at, updated_at
            FROM satellites
            WHERE planet_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(planet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(satellites)
    }

    /// Apply a partial update
    pub async fn update(
        &self,
        id: Uuid,
        updates: &UpdateSatellite,
    ) -> Result<Satellite, SatelliteRepositoryError> {
        let satellite = sqlx::query_as::<_, Satellite>(
            r#"
            UPDATE satellites
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                radius_km = COALESCE($4, radius_km),
                orbital_period_days = COALESCE($5, orbital_period_days)
            WHERE id = $1
            RETURNING id, planet_id, name, description, radius_km, orbital_period_days,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&updates.name)
        .bind(&updates.description)
        .bind(updates.radius_km)
        .bind(updates.orbital_period_days)
        .fetch_optional(&self.pool)
        .await?;

        satellite.ok_or(SatelliteRepositoryError::NotFound)
    }

    /// Delete a satellite
    pub async fn delete(&self, id: Uuid) -> Result<bool, SatelliteRepositoryError> {
        let result = sqlx::query("DELETE FROM satellites WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satellite_repository_error_display() {
        assert_eq!(
            format!("{}", SatelliteRepositoryError::NotFound),
            "Satellite not found"
        );
        assert_eq!(
            format!("{}", SatelliteRepositoryError::PlanetNotFound),
            "Planet not found"
        );
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_create_for_missing_planet_fails() {
        use crate::core::db::pool::{DbConfig, create_pool};

        let config = DbConfig::from_env().expect("DATABASE_URL must be set for tests");
        let pool = create_pool(&config).await.expect("Failed to create pool");
        let repo = SatelliteRepository::new(pool);

        let result = repo
            .create(&CreateSatellite {
                planet_id: Uuid::new_v4(),
                name: "Orphan Moon".to_string(),
                description: None,
                radius_km: None,
                orbital_period_days: None,
            })
            .await;

        assert!(matches!(
            result,
            Err(SatelliteRepositoryError::PlanetNotFound)
        ));
    }
}
