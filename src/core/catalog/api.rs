//! Catalog API endpoints
//!
//! REST endpoints for the celestial catalog rendered by the front-end:
//! - GET    /api/systems            - List celestial systems
//! - POST   /api/systems            - Create a system (admin)
//! - GET    /api/systems/{id}       - Get a system by ID
//! - PUT    /api/systems/{id}       - Update a system (admin)
//! - DELETE /api/systems/{id}       - Delete a system (admin)
//! - GET    /api/planets            - List planets, optionally by system
//! - POST   /api/planets            - Create a planet (admin)
//! - GET    /api/planets/{id}       - Get a planet by ID
//! - PUT    /api/planets/{id}       - Update a planet (admin)
//! - DELETE /api/planets/{id}       - Delete a planet (admin)
//! - GET    /api/satellites         - List satellites, optionally by planet
//! - POST   /api/satellites         - Create a satellite (admin)
//! - GET    /api/satellites/{id}    - Get a satellite by ID
//! - PUT    /api/satellites/{id}    - Update a satellite (admin)
//! - DELETE /api/satellites/{id}    - Delete a satellite (admin)
//!
//! Reads are public; writes require an access token with the Admin role.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::auth::JwtService;
use crate::core::auth::api::extract_access_token;
use crate::core::db::models::{
    CelestialSystem, CreateCelestialSystem, CreatePlanet, CreateSatellite, Planet, Satellite,
    UpdateCelestialSystem, UpdatePlanet, UpdateSatellite,
};
use crate::core::db::repositories::{
    PlanetRepository, PlanetRepositoryError, SatelliteRepository, SatelliteRepositoryError,
    SystemRepository, SystemRepositoryError,
};

/// Catalog API state: the three repositories plus the JWT service for the
/// admin gate
#[derive(Clone)]
pub struct CatalogApiState {
    pub system_repo: SystemRepository,
    pub planet_repo: PlanetRepository,
    pub satellite_repo: SatelliteRepository,
    pub jwt_service: JwtService,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Catalog API error types
#[derive(Debug, thiserror::Error)]
pub enum CatalogApiError {
    #[error("System not found")]
    SystemNotFound,

    #[error("Planet not found")]
    PlanetNotFound,

    #[error("Satellite not found")]
    SatelliteNotFound,

    #[error("System name already exists")]
    NameAlreadyExists,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Admin role required")]
    Forbidden,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<SystemRepositoryError> for CatalogApiError {
    fn from(err: SystemRepositoryError) -> Self {
        match err {
            SystemRepositoryError::NotFound => CatalogApiError::SystemNotFound,
            SystemRepositoryError::NameAlreadyExists => CatalogApiError::NameAlreadyExists,
            SystemRepositoryError::DatabaseError(e) => CatalogApiError::InternalError(e.to_string()),
        }
    }
}

impl From<PlanetRepositoryError> for CatalogApiError {
    fn from(err: PlanetRepositoryError) -> Self {
        match err {
            PlanetRepositoryError::NotFound => CatalogApiError::PlanetNotFound,
            PlanetRepositoryError::SystemNotFound => CatalogApiError::SystemNotFound,
            PlanetRepositoryError::DatabaseError(e) => CatalogApiError::InternalError(e.to_string()),
        }
    }
}

impl From<SatelliteRepositoryError> for CatalogApiError {
    fn from(err: SatelliteRepositoryError) -> Self {
        match err {
            SatelliteRepositoryError::NotFound => CatalogApiError::SatelliteNotFound,
            SatelliteRepositoryError::PlanetNotFound => CatalogApiError::PlanetNotFound,
            SatelliteRepositoryError::DatabaseError(e) => {
                CatalogApiError::InternalError(e.to_string())
            }
        }
    }
}

/// Convert CatalogApiError to API response
impl IntoResponse for CatalogApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            CatalogApiError::SystemNotFound => (StatusCode::NOT_FOUND, "SYSTEM_NOT_FOUND"),
            CatalogApiError::PlanetNotFound => (StatusCode::NOT_FOUND, "PLANET_NOT_FOUND"),
            CatalogApiError::SatelliteNotFound => (StatusCode::NOT_FOUND, "SATELLITE_NOT_FOUND"),
            CatalogApiError::NameAlreadyExists => (StatusCode::CONFLICT, "NAME_EXISTS"),
            CatalogApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            CatalogApiError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            CatalogApiError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let message = if let CatalogApiError::InternalError(detail) = &self {
            tracing::error!(error = %detail, "internal error in catalog endpoint");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ApiError::new(message, code))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct PlanetListQuery {
    pub system_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SatelliteListQuery {
    pub planet_id: Option<Uuid>,
}

/// Create the catalog API router
pub fn catalog_api_router(state: CatalogApiState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/systems", get(list_systems).post(create_system))
        .route(
            "/api/systems/{id}",
            get(get_system).put(update_system).delete(delete_system),
        )
        .route("/api/planets", get(list_planets).post(create_planet))
        .route(
            "/api/planets/{id}",
            get(get_planet).put(update_planet).delete(delete_planet),
        )
        .route("/api/satellites", get(list_satellites).post(create_satellite))
        .route(
            "/api/satellites/{id}",
            get(get_satellite)
                .put(update_satellite)
                .delete(delete_satellite),
        )
        .with_state(state)
}

/// Require a valid access token carrying the Admin role
fn require_admin(state: &CatalogApiState, headers: &HeaderMap) -> Result<(), CatalogApiError> {
    let token = extract_access_token(headers).map_err(|_| CatalogApiError::Unauthorized)?;
    let claims = state
        .jwt_service
        .validate_access_token(&token)
        .map_err(|_| CatalogApiError::Unauthorized)?;

    if !claims.is_admin() {
        return Err(CatalogApiError::Forbidden);
    }

    Ok(())
}

// ----------------------------------------------------------------------
// Systems
// ----------------------------------------------------------------------

/// GET /api/systems
async fn list_systems(
    State(state): State<Arc<CatalogApiState>>,
) -> Result<Json<Vec<CelestialSystem>>, CatalogApiError> {
    let systems = state.system_repo.list().await?;

    Ok(Json(systems))
}

/// GET /api/systems/{id}
async fn get_system(
    State(state): State<Arc<CatalogApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CelestialSystem>, CatalogApiError> {
    let system = state
        .system_repo
        .find_by_id(id)
        .await?
        .ok_or(CatalogApiError::SystemNotFound)?;

    Ok(Json(system))
}

/// POST /api/systems (admin)
async fn create_system(
    State(state): State<Arc<CatalogApiState>>,
    headers: HeaderMap,
    Json(request): Json<CreateCelestialSystem>,
) -> Result<(StatusCode, Json<CelestialSystem>), CatalogApiError> {
    require_admin(&state, &headers)?;

    let system = state.system_repo.create(&request).await?;

    tracing::info!(system_id = %system.id, name = %system.name, "system created");

    Ok((StatusCode::CREATED, Json(system)))
}

/// PUT /api/systems/{id} (admin)
async fn update_system(
    State(state): State<Arc<CatalogApiState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCelestialSystem>,
) -> Result<Json<CelestialSystem>, CatalogApiError> {
    require_admin(&state, &headers)?;

    let system = state.system_repo.update(id, &request).await?;

    Ok(Json(system))
}

/// DELETE /api/systems/{id} (admin)
async fn delete_system(
    State(state): State<Arc<CatalogApiState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CatalogApiError> {
    require_admin(&state, &headers)?;

    if !state.system_repo.delete(id).await? {
        return Err(CatalogApiError::SystemNotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------
// Planets
// ----------------------------------------------------------------------

/// GET /api/planets?system_id=
async fn list_planets(
    State(state): State<Arc<CatalogApiState>>,
    Query(query): Query<PlanetListQuery>,
) -> Result<Json<Vec<Planet>>, CatalogApiError> {
    let planets = match query.system_id {
        Some(system_id) => state.planet_repo.list_by_system(system_id).await?,
        None => state.planet_repo.list().await?,
    };

    Ok(Json(planets))
}

/// GET /api/planets/{id}
async fn get_planet(
    State(state): State<Arc<CatalogApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Planet>, CatalogApiError> {
    let planet = state
        .planet_repo
        .find_by_id(id)
        .await?
        .ok_or(CatalogApiError::PlanetNotFound)?;

    Ok(Json(planet))
}

/// POST /api/planets (admin)
async fn create_planet(
    State(state): State<Arc<CatalogApiState>>,
    headers: HeaderMap,
    Json(request): Json<CreatePlanet>,
) -> Result<(StatusCode, Json<Planet>), CatalogApiError> {
    require_admin(&state, &headers)?;

    let planet = state.planet_repo.create(&request).await?;

    tracing::info!(planet_id = %planet.id, name = %planet.name, "planet created");

    Ok((StatusCode::CREATED, Json(planet)))
}

/// PUT /api/planets/{id} (admin)
async fn update_planet(
    State(state): State<Arc<CatalogApiState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePlanet>,
) -> Result<Json<Planet>, CatalogApiError> {
    require_admin(&state, &headers)?;

    let planet = state.planet_repo.update(id, &request).await?;

    Ok(Json(planet))
}

/// DELETE /api/planets/{id} (admin)
async fn delete_planet(
    State(state): State<Arc<CatalogApiState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CatalogApiError> {
    require_admin(&state, &headers)?;

    if !state.planet_repo.delete(id).await? {
        return Err(CatalogApiError::PlanetNotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------
// Satellites
// ----------------------------------------------------------------------

/// GET /api/satellites?planet_id=
async fn list_satellites(
    State(state): State<Arc<CatalogApiState>>,
    Query(query): Query<SatelliteListQuery>,
) -> Result<Json<Vec<Satellite>>, CatalogApiError> {
    let satellites = match query.planet_id {
        Some(planet_id) => state.satellite_repo.list_by_planet(planet_id).await?,
        None => state.satellite_repo.list().await?,
    };

    Ok(Json(satellites))
}

/// GET /api/satellites/{id}
async fn get_satellite(
    State(state): State<Arc<CatalogApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Satellite>, CatalogApiError> {
    let satellite = state
        .satellite_repo
        .find_by_id(id)
        .await?
        .ok_or(CatalogApiError::SatelliteNotFound)?;

    Ok(Json(satellite))
}

/// POST /api/satellites (admin)
async fn create_satellite(
    State(state): State<Arc<CatalogApiState>>,
    headers: HeaderMap,
    Json(request): Json<CreateSatellite>,
) -> Result<(StatusCode, Json<Satellite>), CatalogApiError> {
    require_admin(&state, &headers)?;

    let satellite = state.satellite_repo.create(&request).await?;

    tracing::info!(satellite_id = %satellite.id, name = %satellite.name, "satellite created");

    Ok((StatusCode::CREATED, Json(satellite)))
}

/// PUT /api/satellites/{id} (admin)
async fn update_satellite(
    State(state): State<Arc<CatalogApiState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateSatellite>,
) -> Result<Json<Satellite>, CatalogApiError> {
    require_admin(&state, &headers)?;

    let satellite = state.satellite_repo.update(id, &request).await?;

    Ok(Json(satellite))
}

/// DELETE /api/satellites/{id} (admin)
async fn delete_satellite(
    State(state): State<Arc<CatalogApiState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CatalogApiError> {
    require_admin(&state, &headers)?;

    if !state.satellite_repo.delete(id).await? {
        return Err(CatalogApiError::SatelliteNotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
