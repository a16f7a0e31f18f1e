//! HTTP request handlers.

pub mod auth_handler;
pub mod place_handler;
pub mod user_handler;
