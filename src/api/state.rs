//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::infra::{AssetStore, Database, Geocoder, HealthCheck};
use crate::services::{AuthService, PlaceService, ServiceContainer, Services, UserService};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Place service (consistency coordinator)
    pub place_service: Arc<dyn PlaceService>,
    /// Uploaded image storage
    pub assets: Arc<dyn AssetStore>,
    /// Backing store liveness probe
    pub health: Arc<dyn HealthCheck>,
    /// Directory served under `/uploads/images`
    pub upload_dir: PathBuf,
}

impl AppState {
    /// Create application state from a database connection and config.
    pub fn from_config(
        database: Arc<Database>,
        config: Config,
        geocoder: Arc<dyn Geocoder>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        let upload_dir = PathBuf::from(&config.upload_dir);
        let container = Services::from_connection(
            database.get_connection(),
            config,
            geocoder,
            assets.clone(),
        );

        Self::new(&container, assets, database, upload_dir)
    }

    /// Create application state from any service container.
    pub fn new(
        services: &dyn ServiceContainer,
        assets: Arc<dyn AssetStore>,
        health: Arc<dyn HealthCheck>,
        upload_dir: PathBuf,
    ) -> Self {
        Self {
            auth_service: services.auth(),
            user_service: services.users(),
            place_service: services.places(),
            assets,
            health,
            upload_dir,
        }
    }
}
