//! Account handlers: signup and login.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::{read_upload_form, ValidatedJson};
use crate::api::AppState;
use crate::errors::AppResult;
use crate::services::{AuthResponse, SignupInput};

/// Signup form fields (multipart/form-data; the avatar travels as an `image` file part).
///
/// Documentation only: the account service validates these fields.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    /// User display name
    #[schema(example = "Ann")]
    pub name: String,
    /// User email address
    #[schema(example = "ann@x.com")]
    pub email: String,
    /// User password (minimum 5 characters)
    #[schema(example = "secret1", min_length = 5)]
    pub password: String,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// User email address
    #[validate(length(min = 1, message = "Email is required"))]
    #[schema(example = "ann@x.com")]
    pub email: String,
    /// User password
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "secret1")]
    pub password: String,
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/users/signup",
    tag = "Users",
    request_body(content = SignupRequest, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let mut form = read_upload_form(multipart, state.assets.as_ref()).await?;
    let image = form.take_image()?;

    // The service discards the avatar if signup fails
    let response = state
        .auth_service
        .signup(SignupInput {
            name: form.text("name"),
            email: form.text("email"),
            password: form.text("password"),
            image,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Login and get JWT token
#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let response = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;

    Ok(Json(response))
}
