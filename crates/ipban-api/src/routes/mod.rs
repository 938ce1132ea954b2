//! Route definitions
//!
//! API routes are mounted under /api/v1; health routes stay at the root.

use axum::{
    routing::{delete, get},
    Router,
};

use crate::handlers::{health, ip_bans, session};
use crate::state::AppState;

/// Create the main API router (health routes are separate so they skip the ban gate)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/session", get(session::get_session))
        .merge(ip_ban_routes())
}

/// Ban management routes
fn ip_ban_routes() -> Router<AppState> {
    Router::new()
        .route("/ip-bans", get(ip_bans::list_bans).post(ip_bans::create_ban))
        .route("/ip-bans/:ban_id", delete(ip_bans::delete_ban))
}
