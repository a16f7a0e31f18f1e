//! OpenAPI documentation configuration.
//!
//! The generated document is served at `/api-docs/openapi.json`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, place_handler, user_handler};
use crate::domain::{Coordinates, Place, UserResponse};
use crate::services::AuthResponse;
use crate::types::MessageResponse;

/// OpenAPI documentation for the Places API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Places API",
        version = "0.1.0",
        description = "Users share geocoded places; every place is kept attached to its creator",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Users
        user_handler::list_users,
        auth_handler::signup,
        auth_handler::login,
        // Places
        place_handler::get_place,
        place_handler::get_places_by_user,
        place_handler::create_place,
        place_handler::update_place,
        place_handler::delete_place,
    ),
    components(
        schemas(
            UserResponse,
            Place,
            Coordinates,
            AuthResponse,
            MessageResponse,
            auth_handler::SignupRequest,
            auth_handler::LoginRequest,
            place_handler::CreatePlaceRequest,
            place_handler::UpdatePlaceRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Signup, login and user listing"),
        (name = "Places", description = "Geocoded places owned by users")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /api/users/login"))
                        .build(),
                ),
            );
        }
    }
}
