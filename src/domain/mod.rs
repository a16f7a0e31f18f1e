//! Domain layer - Core business entities and logic
//!
//! Users, places and the password value object. Nothing in here touches
//! storage or the network.

pub mod password;
pub mod place;
pub mod user;

pub use password::Password;
pub use place::{Coordinates, NewPlace, Place};
pub use user::{normalize_email, NewUser, User, UserResponse};
