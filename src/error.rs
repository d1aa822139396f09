use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Collaborator error: {0}")]
    Collaborator(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl AppError {
    pub fn not_found(entity: &str) -> Self {
        AppError::NotFound(entity.to_string())
    }

    /// Maps a UNIQUE constraint violation to `Conflict`, everything else stays a database error.
    pub fn from_unique_violation(err: sqlx::Error, message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(message.to_string())
            }
            _ => AppError::Database(err),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                format!("Please check your input data: {}", msg),
            ),
            AppError::NotFound(entity) => (
                StatusCode::NOT_FOUND,
                format!("{} not found", entity),
                format!("The requested {} could not be found", entity.to_lowercase()),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict".to_string(), msg),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized".to_string(),
                "Caller identity is missing or invalid".to_string(),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "Forbidden".to_string(), msg),
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    e.to_string(),
                )
            }
            AppError::Migration(e) => {
                error!("migration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    e.to_string(),
                )
            }
            AppError::Collaborator(msg) => {
                error!("collaborator error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Upstream service failed".to_string(),
                    msg,
                )
            }
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "Internal server error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            success: false,
            error,
            message,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Validation("title".into()), StatusCode::BAD_REQUEST),
            (AppError::not_found("Course"), StatusCode::NOT_FOUND),
            (AppError::Conflict("dup".into()), StatusCode::CONFLICT),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("role".into()), StatusCode::FORBIDDEN),
            (AppError::Collaborator("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::InternalServerError, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_not_found_message() {
        let err = AppError::not_found("Submission");
        assert_eq!(err.to_string(), "Submission not found");
    }
}
