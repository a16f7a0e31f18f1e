//! Serve command - Starts the HTTP server.

use std::sync::Arc;

use reqwest::Url;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{ArcGisGeocoder, Database, LocalAssetStore};

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }

    // Connect and apply pending migrations
    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database startup failed: {}", e)))?;
    let db = Arc::new(db);

    let endpoint = Url::parse(&config.geocoder_url)
        .map_err(|e| AppError::internal(format!("Invalid GEOCODER_URL: {}", e)))?;
    let geocoder = ArcGisGeocoder::new(endpoint, config.geocoder_timeout)
        .map_err(|e| AppError::internal(format!("Failed to build geocoder client: {}", e)))?;
    tracing::info!(url = %config.geocoder_url, "Geocoder configured");

    let assets = LocalAssetStore::new(&config.upload_dir);
    assets.ensure_root().await?;

    let addr = config.server_addr();
    let app_state = AppState::from_config(db, config, Arc::new(geocoder), Arc::new(assets));
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
