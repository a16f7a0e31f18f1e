//! Places API - users share places, each geocoded from a free-text address.
//!
//! The core keeps two collections consistent: every place names its creator,
//! and every user lists the places they created. Creates and deletes touch
//! both inside a single transaction.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Users, places, passwords
//! - **services**: Use cases; the place coordinator and account service
//! - **infra**: Database, repositories, unit of work, geocoder, asset storage
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared response types
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server (applies pending migrations first)
//! cargo run -- serve
//!
//! # Inspect or run migrations
//! cargo run -- migrate status
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Coordinates, Password, Place, User};
pub use errors::{AppError, AppResult};
