//! HTTP Error Types
//!
//! Maps application errors to status codes and a JSON error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cgsg_core::domain::DomainError;
use cgsg_core::error::AppError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Error codes carried in the response body
pub mod code {
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const FORBIDDEN: &str = "forbidden";
    pub const NOT_FOUND: &str = "not_found";
    pub const CONFLICT: &str = "conflict";
    pub const INTERNAL_ERROR: &str = "internal_error";
    pub const DB_ERROR: &str = "database_error";
}

/// `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Wrapper so `AppError` can be returned from handlers
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(AppError::Domain(err))
    }
}

impl ApiError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            AppError::Validation(_) | AppError::Serialization(_) => {
                (StatusCode::BAD_REQUEST, code::VALIDATION_ERROR)
            }
            AppError::Domain(_) => (StatusCode::BAD_REQUEST, code::VALIDATION_ERROR),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, code::UNAUTHORIZED),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, code::FORBIDDEN),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, code::NOT_FOUND),
            AppError::Conflict(_) => (StatusCode::CONFLICT, code::CONFLICT),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, code::DB_ERROR),
            AppError::Config(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, code::INTERNAL_ERROR)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            error!(code, error = %self.0, "Request failed");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.0.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}
