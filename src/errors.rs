// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Each variant maps to an HTTP status code and a JSON error body.
/// Persistence failures are logged where they happen and reach the caller only
/// as `InternalError` with a fixed message, never the underlying cause.
#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Forbidden access")]
    Forbidden,

    #[error("{0}")]
    InternalError(String),

    /// Object storage failure. Only ever logged by the photo removal flow.
    #[error("Object storage error: {0}")]
    StorageError(String),
}

impl PortfolioError {
    /// Log a database failure and hide it behind a caller-facing message
    pub fn database(action: &str, err: sqlx::Error) -> Self {
        log::error!("Failed to {}: {}", action, err);
        PortfolioError::InternalError(format!("Failed to {}", action))
    }

    fn code(&self) -> (StatusCode, &'static str) {
        match self {
            PortfolioError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            PortfolioError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            PortfolioError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            PortfolioError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            PortfolioError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            PortfolioError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            PortfolioError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            PortfolioError::StorageError(_) => (StatusCode::BAD_GATEWAY, "STORAGE_ERROR"),
        }
    }
}

/// Convert PortfolioError to HTTP response
impl ResponseError for PortfolioError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_code) = self.code();

        let body = json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        self.code().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PortfolioError::NotFound("Photo not found".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PortfolioError::BadRequest("id is required".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(PortfolioError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(PortfolioError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_database_error_hides_cause() {
        let err = PortfolioError::database("create photo", sqlx::Error::RowNotFound);

        assert_eq!(err.to_string(), "Failed to create photo");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
