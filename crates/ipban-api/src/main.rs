//! IP ban API server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p ipban-api
//! ```
//!
//! Configuration is loaded from environment variables or a `.env` file.

use ipban_common::{try_init_tracing, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize tracing
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    // Run the server
    if let Err(e) = run().await {
        error!(error = %e, "Server failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting IP ban API server...");

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        port = config.api.port,
        cache_ttl_secs = config.ipban.cache_ttl_secs,
        "Configuration loaded"
    );

    ipban_api::run(config).await?;

    Ok(())
}
