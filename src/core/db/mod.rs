//! Database module for CosmoVerse
//!
//! Connectivity, models, and repositories for persistent storage using
//! PostgreSQL and SQLx.

pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used items
pub use models::*;
pub use pool::{DbConfig, DbError, create_pool, create_pool_with_migrations};
pub use repositories::{
    PlanetRepository, PlanetRepositoryError, ResetRepositoryError, ResetTokenRepository,
    SatelliteRepository, SatelliteRepositoryError, SystemRepository, SystemRepositoryError,
    UserRepository, UserRepositoryError, VerificationRepositoryError, VerificationTokenRepository,
};

pub use sqlx::PgPool;
