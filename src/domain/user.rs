//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub image: String,
    /// Ids of the places this user owns, in creation order
    pub places: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Check whether the place id is attached to this user
    pub fn owns(&self, place_id: Uuid) -> bool {
        self.places.contains(&place_id)
    }

    /// Append a place id; a repeated id is not appended twice
    pub fn attach_place(&mut self, place_id: Uuid) {
        if !self.owns(place_id) {
            self.places.push(place_id);
        }
    }

    /// Remove a place id, returning whether it was attached
    pub fn detach_place(&mut self, place_id: Uuid) -> bool {
        let before = self.places.len();
        self.places.retain(|id| *id != place_id);
        self.places.len() != before
    }
}

/// Canonical form of an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Data needed to insert a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub image: String,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// User display name
    #[schema(example = "Ann")]
    pub name: String,
    /// User email address
    #[schema(example = "ann@x.com")]
    pub email: String,
    /// Avatar path
    #[schema(example = "uploads/images/5a0c9f1e.png")]
    pub image: String,
    /// Owned place ids
    pub places: Vec<Uuid>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            image: user.image,
            places: user.places,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password_hash: "hashed".to_string(),
            image: "uploads/images/ann.png".to_string(),
            places: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_attach_is_idempotent() {
        let mut user = user();
        let place = Uuid::new_v4();
        user.attach_place(place);
        user.attach_place(place);
        assert_eq!(user.places, vec![place]);
    }

    #[test]
    fn test_detach_keeps_order_of_the_rest() {
        let mut user = user();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        user.places = vec![a, b, c];

        assert!(user.detach_place(b));
        assert_eq!(user.places, vec![a, c]);
        assert!(!user.detach_place(b));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ann@X.com "), "ann@x.com");
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
