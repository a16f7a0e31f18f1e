//! Place handlers.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{read_upload_form, ValidatedJson};
use crate::api::AppState;
use crate::domain::Place;
use crate::errors::AppResult;
use crate::services::{CreatePlaceInput, Identity};
use crate::types::MessageResponse;

/// Create place form (multipart/form-data, plus an `image` file part)
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePlaceRequest {
    #[schema(example = "Empire State Building")]
    pub title: String,
    #[schema(example = "One of the most famous sky scrapers in the world")]
    pub description: String,
    #[schema(example = "20 W 34th St, New York, NY 10001")]
    pub address: String,
    /// Place image (png, jpg or jpeg)
    #[schema(value_type = String, format = Binary)]
    pub image: String,
}

/// Update place request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePlaceRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    #[schema(example = "Empire State Building")]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    #[schema(example = "Still one of the most famous sky scrapers")]
    pub description: String,
}

/// Get place by ID
#[utoipa::path(
    get,
    path = "/api/places/{pid}",
    tag = "Places",
    params(("pid" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Place found", body = Place),
        (status = 404, description = "Place not found")
    )
)]
pub async fn get_place(
    State(state): State<AppState>,
    Path(pid): Path<Uuid>,
) -> AppResult<Json<Place>> {
    let place = state.place_service.get_place(pid).await?;
    Ok(Json(place))
}

/// List the places a user owns
#[utoipa::path(
    get,
    path = "/api/places/user/{uid}",
    tag = "Places",
    params(("uid" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Places of the user, in creation order", body = Vec<Place>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_places_by_user(
    State(state): State<AppState>,
    Path(uid): Path<Uuid>,
) -> AppResult<Json<Vec<Place>>> {
    let places = state.place_service.get_places_by_user(uid).await?;
    Ok(Json(places))
}

/// Create a place owned by the current user
#[utoipa::path(
    post,
    path = "/api/places",
    tag = "Places",
    request_body(content = CreatePlaceRequest, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Place created", body = Place),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error or address not found"),
        (status = 503, description = "Geocoding service unavailable")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_place(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Place>)> {
    let mut form = read_upload_form(multipart, state.assets.as_ref()).await?;
    let image = form.take_image()?;

    let place = state
        .place_service
        .create_place(CreatePlaceInput {
            owner_id: identity.user_id,
            title: form.text("title"),
            description: form.text("description"),
            address: form.text("address"),
            image,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(place)))
}

/// Update title and description of a place the current user created
#[utoipa::path(
    patch,
    path = "/api/places/{pid}",
    tag = "Places",
    params(("pid" = Uuid, Path, description = "Place ID")),
    request_body = UpdatePlaceRequest,
    responses(
        (status = 200, description = "Place updated", body = Place),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the creator"),
        (status = 404, description = "Place not found"),
        (status = 422, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_place(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(pid): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdatePlaceRequest>,
) -> AppResult<Json<Place>> {
    let place = state
        .place_service
        .update_place(identity.user_id, pid, payload.title, payload.description)
        .await?;

    Ok(Json(place))
}

/// Delete a place the current user created
#[utoipa::path(
    delete,
    path = "/api/places/{pid}",
    tag = "Places",
    params(("pid" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Place deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the creator"),
        (status = 404, description = "Place not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_place(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(pid): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state
        .place_service
        .delete_place(identity.user_id, pid)
        .await?;

    Ok(Json(MessageResponse::new("Deleted place.")))
}
