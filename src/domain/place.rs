//! Place domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Geographic coordinates resolved from an address
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Place domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Place {
    #[schema(example = "3f0d6c1a-8a4e-4c55-9a1b-2f5d7e0c9b11")]
    pub id: Uuid,
    #[schema(example = "Empire State Building")]
    pub title: String,
    #[schema(example = "One of the most famous sky scrapers in the world")]
    pub description: String,
    #[schema(example = "20 W 34th St, New York, NY 10001")]
    pub address: String,
    pub location: Coordinates,
    #[schema(example = "uploads/images/3f0d6c1a.jpeg")]
    pub image: String,
    /// Owning user id, fixed at creation
    pub creator: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Place {
    /// Ownership check by id equality with the stored creator
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.creator == user_id
    }
}

/// Data needed to insert a place
#[derive(Debug, Clone)]
pub struct NewPlace {
    pub title: String,
    pub description: String,
    pub address: String,
    pub location: Coordinates,
    pub image: String,
    pub creator: Uuid,
}
