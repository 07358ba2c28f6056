//! Error types for the campus API
//!
//! Provides unified error handling using thiserror.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{debug, error};

use crate::models::ErrorResponse;

/// Body returned for every infrastructure failure. Details stay in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error.";

// == App Error Enum ==
/// Unified error type for the service.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed identifier or missing/invalid fields
    #[error("Validation error: {0}")]
    Validation(String),

    /// Expected empty result: missing record or empty collection
    #[error("Not found: {0}")]
    NotFound(String),

    /// Document store connection is not established
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Document store rejected or failed an operation
    #[error("Store operation failed: {0}")]
    StoreOperationFailed(String),

    /// Cache connection is not established
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Cache backend rejected or failed an operation
    #[error("Cache operation failed: {0}")]
    CacheOperationFailed(String),

    /// Payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other unexpected failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns true for failures of the store or cache layers.
    pub fn is_infrastructure(&self) -> bool {
        !matches!(self, AppError::Validation(_) | AppError::NotFound(_))
    }
}

/// A request body that is not JSON, or not the expected shape, is a client error.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_ERROR_MESSAGE.to_string(),
            ),
        };

        if self.is_infrastructure() {
            error!(error = %self, "request failed");
        } else {
            debug!(error = %self, "request rejected");
        }

        let body = Json(ErrorResponse::new(message));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the service.
pub type Result<T> = std::result::Result<T, AppError>;
