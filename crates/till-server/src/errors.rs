//! HTTP error mapping.
//!
//! Route handlers and middleware return [`ApiError`]; the `IntoResponse`
//! impl renders the uniform `{"error", "message"}` JSON body and status
//! code. Store and auth errors convert losslessly enough for clients while
//! internal details stay in the logs.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use till_auth::AuthError;
use till_store::StoreError;

/// Request-level error with a fixed HTTP mapping.
#[derive(Debug)]
pub enum ApiError {
    /// Request body failed field validation (400).
    Validation(String),
    /// Referenced entity does not exist (404).
    NotFound(String),
    /// Uniqueness conflict, e.g. a taken username (409).
    Conflict(String),
    /// Missing or invalid credentials (401).
    Unauthorized,
    /// Storage or task failure (500); details are logged, not returned.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::Validation(message) => (StatusCode::BAD_REQUEST, "validation_error", message),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            Self::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "invalid credentials".to_owned(),
            ),
            Self::Internal(detail) => {
                error!(detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_owned(),
                )
            }
        };
        (
            status,
            Json(json!({
                "error": code,
                "message": message,
            })),
        )
            .into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::CategoryNotFound(_)
            | StoreError::ProductNotFound(_)
            | StoreError::InventoryNotFound(_)
            | StoreError::LocationNotFound(_) => Self::NotFound(e.to_string()),
            StoreError::UsernameTaken(_) => Self::Conflict(e.to_string()),
            StoreError::Sqlite(_) | StoreError::Pool(_) | StoreError::Migration { .. } => {
                Self::Internal(e.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => Self::Unauthorized,
            AuthError::TokenEncoding(detail) => Self::Internal(detail),
        }
    }
}
