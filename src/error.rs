use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sqlx::error::ErrorKind;
use thiserror::Error;

/// Stable machine-readable codes carried in every error body.
pub mod code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const INTERNAL: &str = "INTERNAL";
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Authentication credentials were not provided")]
    Unauthorized,

    #[error("{0}")]
    PermissionDenied(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AppError {
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{what} not found"))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => code::NOT_FOUND,
            AppError::Conflict(_) => code::ALREADY_EXISTS,
            AppError::Validation(_) => code::VALIDATION_FAILED,
            AppError::Unauthorized => code::UNAUTHENTICATED,
            AppError::PermissionDenied(_) => code::PERMISSION_DENIED,
            AppError::Database(_) | AppError::Session(_) => code::INTERNAL,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let detail = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                "Internal server error".to_string()
            }
            AppError::Session(e) => {
                tracing::error!("Session error: {e}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = serde_json::json!({
            "code": self.code(),
            "detail": detail,
        });
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => AppError::NotFound("Not found".to_string()),
            sqlx::Error::Database(db) => match db.kind() {
                ErrorKind::UniqueViolation => AppError::Conflict(db.message().to_string()),
                ErrorKind::ForeignKeyViolation => {
                    AppError::Validation("Referenced object does not exist".to_string())
                }
                ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                    AppError::Validation(db.message().to_string())
                }
                _ => AppError::Database(e),
            },
            _ => AppError::Database(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
