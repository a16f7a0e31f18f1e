//! Repository layer - Data access abstraction
//!
//! Two stores, one per record collection. Each has a pool-backed variant for
//! plain reads/writes and a transaction-bound variant used by the unit of work.

pub(crate) mod entities;
mod place_repository;
mod user_repository;

pub use place_repository::{PlaceRepository, PlaceStore, TxPlaceRepository};
pub use user_repository::{TxUserRepository, UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use place_repository::MockPlaceRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
