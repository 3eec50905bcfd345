//! Database models for CosmoVerse
//!
//! Entity structs mapping to PostgreSQL tables, plus the create/update DTOs
//! and sanitized response shapes used by the API layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role strings stored on the user row
pub mod roles {
    pub const ADMIN: &str = "Admin";
    pub const USER: &str = "User";
}

// ============================================================================
// User Model
// ============================================================================

/// User entity representing a registered account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub is_email_verified: bool,
    /// SHA-256 hash of the active refresh token, if any
    #[serde(skip_serializing)]
    pub refresh_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this account may perform admin-only writes
    pub fn is_admin(&self) -> bool {
        self.role == roles::ADMIN
    }
}

/// User data for creation (password already hashed)
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// User without sensitive data (for API responses)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            is_email_verified: user.is_email_verified,
            created_at: user.created_at,
        }
    }
}

// ============================================================================
// Single-Use Token Models
// ============================================================================

/// Email-verification token row; one active row per user
#[derive(Debug, Clone, FromRow)]
pub struct EmailVerificationToken {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Password-reset code row; one row per user, overwritten on re-request
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetToken {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

// ============================================================================
// Celestial System Model
// ============================================================================

/// A star system grouping planets
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CelestialSystem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub distance_light_years: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Celestial system data for creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCelestialSystem {
    pub name: String,
    pub description: Option<String>,
    pub distance_light_years: Option<f64>,
}

/// Celestial system data for updates
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateCelestialSystem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub distance_light_years: Option<f64>,
}

// ============================================================================
// Planet Model
// ============================================================================

/// Planet entity belonging to a celestial system
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Planet {
    pub id: Uuid,
    pub system_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub radius_km: Option<f64>,
    pub orbital_period_days: Option<f64>,
    /// Texture asset rendered by the 3D front-end
    pub texture_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Planet data for creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanet {
    pub system_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub radius_km: Option<f64>,
    pub orbital_period_days: Option<f64>,
    pub texture_url: Option<String>,
}

/// Planet data for updates
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdatePlanet {
    pub name: Option<String>,
    pub description: Option<String>,
    pub radius_km: Option<f64>,
    pub orbital_period_days: Option<f64>,
    pub texture_url: Option<String>,
}

// ============================================================================
// Satellite Model
// ============================================================================

/// Satellite (moon) entity orbiting a planet
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Satellite {
    pub id: Uuid,
    pub planet_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub radius_km: Option<f64>,
    pub orbital_period_days: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Satellite data for creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSatellite {
    pub planet_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub radius_km: Option<f64>,
    pub orbital_period_days: Option<f64>,
}

/// Satellite data for updates
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateSatellite {
    pub name: Option<String>,
    pub description: Option<String>,
    pub radius_km: Option<f64>,
    pub orbital_period_days: Option<f64>,
}
