//! Centralized error handling.
//!
//! Every operation of the core returns one of these kinds. The HTTP layer
//! turns them into a stable `(code, status, message)` triple.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Input
    #[error("{0}")]
    ValidationFailed(String),

    // Lookups
    #[error("Owner not found")]
    OwnerNotFound,

    #[error("Place not found")]
    PlaceNotFound,

    #[error("Could not find this route.")]
    RouteNotFound,

    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Access denied")]
    Forbidden,

    #[error("Email already registered")]
    DuplicateEmail,

    // Geocoding
    #[error("Location not found for the given address")]
    LocationNotFound,

    #[error("Geocoding service unavailable: {0}")]
    UpstreamUnavailable(String),

    // Storage
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Persistence error")]
    PersistenceFailed(#[from] sea_orm::DbErr),

    // Credentials
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuanceFailed(String),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Stable error code for clients
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationFailed(_) => "VALIDATION_FAILED",
            AppError::OwnerNotFound => "OWNER_NOT_FOUND",
            AppError::PlaceNotFound => "PLACE_NOT_FOUND",
            AppError::RouteNotFound => "ROUTE_NOT_FOUND",
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Forbidden => "FORBIDDEN",
            AppError::DuplicateEmail => "DUPLICATE_EMAIL",
            AppError::LocationNotFound => "LOCATION_NOT_FOUND",
            AppError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            AppError::TransactionFailed(_) => "TRANSACTION_FAILED",
            AppError::PersistenceFailed(_) => "PERSISTENCE_FAILED",
            AppError::HashingFailed(_) => "HASHING_FAILED",
            AppError::TokenIssuanceFailed(_) => "TOKEN_ISSUANCE_FAILED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationFailed(_) | AppError::LocationNotFound => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::OwnerNotFound | AppError::PlaceNotFound | AppError::RouteNotFound => {
                StatusCode::NOT_FOUND
            }
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::TransactionFailed(_)
            | AppError::PersistenceFailed(_)
            | AppError::HashingFailed(_)
            | AppError::TokenIssuanceFailed(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// User-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::ValidationFailed(msg) => msg.clone(),

            AppError::UpstreamUnavailable(detail) => {
                tracing::error!("Geocoding upstream failure: {}", detail);
                "The address lookup service is unavailable, please retry later".to_string()
            }
            AppError::TransactionFailed(detail) => {
                tracing::error!("Transaction failure: {}", detail);
                "The operation could not be completed, please retry".to_string()
            }
            AppError::PersistenceFailed(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::HashingFailed(detail) => {
                tracing::error!("Password hashing error: {}", detail);
                "An internal error occurred".to_string()
            }
            AppError::TokenIssuanceFailed(detail) => {
                tracing::error!("Token issuance error: {}", detail);
                "Could not issue a session token, please retry".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::ValidationFailed(msg.into())
    }

    pub fn upstream(detail: impl Into<String>) -> Self {
        AppError::UpstreamUnavailable(detail.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Re-label a storage failure raised inside a unit of work.
    ///
    /// Domain outcomes (not found, forbidden, ...) pass through unchanged.
    pub fn into_transaction_failure(self) -> Self {
        match self {
            AppError::PersistenceFailed(e) => AppError::TransactionFailed(e.to_string()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::PlaceNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::OwnerNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::RouteNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::LocationNotFound.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::upstream("timeout").status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(AppError::DuplicateEmail.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::TransactionFailed("deadlock detected on users".to_string());
        assert!(!err.user_message().contains("deadlock"));

        let err = AppError::upstream("connection refused to 10.0.0.1");
        assert!(!err.user_message().contains("10.0.0.1"));
    }

    #[test]
    fn test_validation_message_is_passed_through() {
        let err = AppError::validation("Title is required");
        assert_eq!(err.user_message(), "Title is required");
        assert_eq!(err.code(), "VALIDATION_FAILED");
    }

    #[test]
    fn test_transaction_relabeling() {
        let storage = AppError::from(sea_orm::DbErr::Custom("connection reset".to_string()));
        assert!(matches!(
            storage.into_transaction_failure(),
            AppError::TransactionFailed(_)
        ));

        assert!(matches!(
            AppError::PlaceNotFound.into_transaction_failure(),
            AppError::PlaceNotFound
        ));
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let response = AppError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "FORBIDDEN");
        assert_eq!(body["error"]["message"], "Access denied");
    }
}
