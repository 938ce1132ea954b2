//! # ipban-api
//!
//! REST API server built with Axum. Every API route sits behind the IP ban gate.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, create_app_with_config, run};
pub use state::AppState;
