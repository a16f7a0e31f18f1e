//! Application route configuration.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{Method, StatusCode},
    middleware,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use super::handlers::{auth_handler, place_handler, user_handler};
use super::middleware::auth_middleware;
use super::openapi::ApiDoc;
use super::AppState;
use crate::config::MAX_UPLOAD_BYTES;
use crate::errors::AppError;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE]);

    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api/users", user_routes())
        .nest("/api/places", place_routes(state.clone()))
        .nest_service("/uploads/images", ServeDir::new(&state.upload_dir))
        .fallback(route_not_found)
        // Global middleware
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Public account routes
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(user_handler::list_users))
        .route("/signup", post(auth_handler::signup))
        .route("/login", post(auth_handler::login))
}

/// Place routes; reads are public, mutations require a bearer token
fn place_routes(state: AppState) -> Router<AppState> {
    let auth = middleware::from_fn_with_state(state, auth_middleware);

    Router::new()
        .route(
            "/",
            post(place_handler::create_place).route_layer(auth.clone()),
        )
        .route("/user/:uid", get(place_handler::get_places_by_user))
        .route(
            "/:pid",
            get(place_handler::get_place).merge(
                patch(place_handler::update_place)
                    .delete(place_handler::delete_place)
                    .route_layer(auth),
            ),
        )
}

async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: ServiceStatus,
}

/// Service status
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint with database connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.health.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: ServiceStatus {
                    status: "healthy",
                    error: None,
                },
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    database: ServiceStatus {
                        status: "unhealthy",
                        error: Some(e.code().to_string()),
                    },
                }),
            )
        }
    }
}
