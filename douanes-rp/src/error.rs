//! Error types for douanes-rp
//!
//! Every handler error becomes a JSON body. Store faults are logged with
//! their detail and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use douanes_common::report::{SubmissionRejection, ValidationError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Message returned in place of store error detail
pub const GENERIC_FAILURE: &str = "Erreur interne, réessayez plus tard.";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or unknown role header (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Role not allowed on this route (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Report field problems, all of them (422)
    #[error("{} validation error(s)", .0.len())]
    Validation(Vec<ValidationError>),

    /// Submission inside the blackout window (423)
    #[error("Dépôt bloqué.")]
    Blocked,

    /// douanes-common error
    #[error(transparent)]
    Common(#[from] douanes_common::Error),
}

impl From<SubmissionRejection> for ApiError {
    fn from(rejection: SubmissionRejection) -> Self {
        match rejection {
            SubmissionRejection::Blocked => ApiError::Blocked,
            SubmissionRejection::Invalid(errors) => ApiError::Validation(errors),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use douanes_common::Error as Common;

        let (status, message) = match self {
            ApiError::Validation(errors) => {
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "errors": errors })))
                    .into_response();
            }
            ApiError::Blocked => (StatusCode::LOCKED, "Dépôt bloqué.".to_string()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Common(Common::NotFound(msg)) => (StatusCode::NOT_FOUND, msg),
            ApiError::Common(Common::InvalidInput(msg)) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Common(err) => {
                error!("Request failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
