//! Service Container - Centralized service access.
//!
//! Wires the unit of work, geocoder and asset store into the services and
//! hands them out behind their traits.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, PlaceCoordinator, PlaceService, UserManager, UserService,
};
use crate::config::Config;
use crate::infra::{AssetStore, Geocoder, Persistence};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;

    /// Get place service
    fn places(&self) -> Arc<dyn PlaceService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    place_service: Arc<dyn PlaceService>,
}

impl Services {
    /// Create a new service container from already-built services
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        place_service: Arc<dyn PlaceService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            place_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: Config,
        geocoder: Arc<dyn Geocoder>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db, config.transaction_timeout));
        let auth_service = Arc::new(Authenticator::new(uow.clone(), config, assets.clone()));
        let user_service = Arc::new(UserManager::new(uow.clone()));
        let place_service = Arc::new(PlaceCoordinator::new(uow, geocoder, assets));

        Self {
            auth_service,
            user_service,
            place_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn places(&self) -> Arc<dyn PlaceService> {
        self.place_service.clone()
    }
}
