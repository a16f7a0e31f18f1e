//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion, and reach storage through the Unit of Work.

mod auth_service;
pub mod container;
mod place_service;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{
    AuthResponse, AuthService, Authenticator, Claims, Identity, IssuedToken, SignupInput,
};
pub use place_service::{CreatePlaceInput, PlaceCoordinator, PlaceService};
pub use user_service::{UserManager, UserService};
