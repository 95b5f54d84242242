//! # Web API Error Types
//!
//! HTTP-facing errors and their response conversions. Every error renders as
//! `{"error": {"code": ..., "message": ...}}`.

use crate::error::VersionError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Project '{project}' is not configured")]
    ProjectNotFound { project: String },

    #[error("Version cache unavailable and project not configured")]
    CacheUnavailable,

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Patch rejected")]
    Validation { violations: Vec<String> },

    #[error("JSON serialization/deserialization error")]
    JsonError,

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn not_found(project: impl Into<String>) -> Self {
        Self::ProjectNotFound {
            project: project.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status_code, error_code) = match &self {
            ApiError::ProjectNotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::CacheUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "CACHE_UNAVAILABLE"),
            ApiError::BadRequest { .. } => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            ApiError::JsonError => (StatusCode::BAD_REQUEST, "JSON_ERROR"),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let error_response = match &self {
            ApiError::Validation { violations } => json!({
                "error": {
                    "code": error_code,
                    "message": message,
                    "details": violations
                }
            }),
            _ => json!({
                "error": {
                    "code": error_code,
                    "message": message
                }
            }),
        };

        (status_code, Json(error_response)).into_response()
    }
}

impl From<VersionError> for ApiError {
    fn from(err: VersionError) -> Self {
        match err {
            VersionError::Validation(e) => ApiError::Validation {
                violations: e.violations().to_vec(),
            },
            other => {
                error!(error = %other, "Unhandled error in request");
                ApiError::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_) => {
                ApiError::JsonError
            }
            other => ApiError::bad_request(other.body_text()),
        }
    }
}

/// Result type alias for web API operations
pub type ApiResult<T> = Result<T, ApiError>;
