use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use cosmoverse::core::auth::{
    AuthApiState, AuthService, JwtService, RefreshTokenManager, auth_api_router,
};
use cosmoverse::core::catalog::{CatalogApiState, catalog_api_router};
use cosmoverse::core::config::Config;
use cosmoverse::core::db::pool::{DbConfig, create_pool_with_migrations};
use cosmoverse::core::db::repositories::{
    PlanetRepository, ResetTokenRepository, SatelliteRepository, SystemRepository, UserRepository,
    VerificationTokenRepository,
};
use cosmoverse::core::email::{LogMailer, MailConfig};

#[tokio::main]
async fn main() {
    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load application config from environment variables
    let config = Config::from_env();

    // Log config status (without revealing secrets)
    tracing::info!(
        listen_addr = %config.listen_addr,
        allowed_origins = ?config.allowed_origins,
        mail_transport_configured = MailConfig::from_env().is_ok(),
        "configuration loaded"
    );

    // Database pool; migrations run at startup
    let db_config = DbConfig::from_env().expect("DATABASE_URL environment variable is not set");
    let pool = create_pool_with_migrations(&db_config)
        .await
        .expect("failed to connect to database");

    // JWT signing-key misconfiguration is fatal here, not per-request
    let jwt_service = JwtService::from_env().expect("JWT_SECRET environment variable is not set");

    let user_repo = UserRepository::new(pool.clone());
    let verification_repo = VerificationTokenRepository::new(pool.clone());
    let reset_repo = ResetTokenRepository::new(pool.clone());
    let refresh_manager = RefreshTokenManager::new(user_repo.clone());

    // Real SMTP delivery is wired in by the deployment; the log mailer keeps
    // the verification and reset flows exercisable without credentials
    let mailer = Arc::new(LogMailer);

    let auth_service = AuthService::new(
        user_repo,
        verification_repo,
        reset_repo,
        jwt_service.clone(),
        refresh_manager,
        mailer,
        config.app_origin(),
    );

    let auth_api = auth_api_router(AuthApiState { auth_service });

    let catalog_api = catalog_api_router(CatalogApiState {
        system_repo: SystemRepository::new(pool.clone()),
        planet_repo: PlanetRepository::new(pool.clone()),
        satellite_repo: SatelliteRepository::new(pool.clone()),
        jwt_service,
    });

    let cors = cors_layer(&config.allowed_origins);

    let app = Router::new()
        .merge(auth_api)
        .merge(catalog_api)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    tracing::info!("listening on http://{}", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind listen address");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

/// CORS for the browser front-end; credentials are allowed because the token
/// pair travels in cookies
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
