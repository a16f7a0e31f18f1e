//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - The geocoding HTTP client
//! - Uploaded image storage
//! - Unit of Work for transaction management

pub mod assets;
pub mod db;
pub mod geocoding;
pub mod repositories;
pub mod unit_of_work;

pub use assets::{AssetStore, LocalAssetStore};
pub use db::{Database, HealthCheck, Migrator};
pub use geocoding::{ArcGisGeocoder, Geocoder};
pub use repositories::{PlaceRepository, PlaceStore, UserRepository, UserStore};
pub use unit_of_work::{Persistence, TransactionContext, TxFuture, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use assets::MockAssetStore;
#[cfg(any(test, feature = "test-utils"))]
pub use geocoding::MockGeocoder;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockPlaceRepository, MockUserRepository};
