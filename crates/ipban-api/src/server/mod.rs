//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{middleware::from_fn_with_state, Router};
use ipban_cache::BanCacheConfig;
use ipban_common::{AppConfig, AppError, JwtService};
use ipban_db::{create_pool, PgBanRepository, PgUserRepository};
use ipban_service::{IpBanSettings, ServiceContextBuilder};
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::{apply_middleware, apply_middleware_with_config, ban_gate};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Health routes plus the API routes behind the ban gate
fn gated_router(state: &AppState) -> Router<AppState> {
    let api = create_router().layer(from_fn_with_state(state.clone(), ban_gate));
    health_routes().merge(api)
}

/// Build the complete Axum application with all routes and middleware
///
/// The rate limiter and configured CORS are left out; see
/// [`create_app_with_config`] for the production stack.
pub fn create_app(state: AppState) -> Router {
    let router = apply_middleware(gated_router(&state));
    router.with_state(state)
}

/// Build the application with rate limiting and configured CORS
pub fn create_app_with_config(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let router = apply_middleware_with_config(
        gated_router(&state),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )?;
    Ok(router.with_state(state))
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    // Create database pool
    info!("Connecting to PostgreSQL...");
    let db_config = ipban_db::DatabaseConfig::from(&config.database);
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    // Create JWT service
    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    ));

    // Create repositories
    let ban_repo = Arc::new(PgBanRepository::new(pool.clone()));
    let user_repo = Arc::new(PgUserRepository::new(pool));

    // Build service context
    let service_context = ServiceContextBuilder::new()
        .ban_repo(ban_repo)
        .user_repo(user_repo)
        .cache_config(BanCacheConfig::from(&config.ipban))
        .settings(IpBanSettings::from(&config.ipban))
        .jwt_service(jwt_service)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config))
}

/// Run the HTTP server
///
/// Peer addresses are recorded on every connection; the ban gate reads them.
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let host: IpAddr = config
        .api
        .host
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid API_HOST '{}': {e}", config.api.host)))?;
    let addr = SocketAddr::new(host, config.api.port);

    // Create app state
    let state = create_app_state(config).await?;

    // Build application
    let app = create_app_with_config(state)?;

    // Run server
    run_server(app, addr).await
}
