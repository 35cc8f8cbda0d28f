//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the API service
///
/// Every error is caught at the route boundary and mapped to a JSON body.
/// Validation failures carry the full list of messages; store failures are
/// logged where they occur and surfaced generically.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or out-of-range input
    #[error("Validation failed")]
    Validation(Vec<String>),

    /// Duplicate username
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad credentials on login (missing user and wrong password look alike)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, invalid, or expired bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but not the resource owner
    #[error("Forbidden")]
    Forbidden,

    /// No such record
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

/// Check whether a repository error is a unique-constraint violation
///
/// Lets the registration handler answer a concurrent duplicate with the
/// same conflict body as the pre-check instead of a 500.
pub fn is_unique_violation(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(messages) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": messages }))).into_response()
            }
            ApiError::Conflict(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": [message] }))).into_response()
            }
            ApiError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid credentials" })),
            )
                .into_response(),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            )
                .into_response(),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "You do not own this resource" })),
            )
                .into_response(),
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response(),
        }
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
