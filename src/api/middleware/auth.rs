//! JWT authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::errors::AppError;

/// JWT authentication middleware.
///
/// Verifies the `Authorization: Bearer` header and injects the resulting
/// [`Identity`](crate::services::Identity) into the request extensions.
/// Handlers take the acting user only from there.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let raw = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let identity = state.auth_service.authenticate(raw)?;
    tracing::debug!(user_id = %identity.user_id, "Request authenticated");

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
