use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

const ACTIVE_APPLICATION_INDEX: &str = "drive_applications_active_unique";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No documents modified: {0}")]
    NoOp(String),

    #[error("Lifecycle locked: {0}")]
    LifecycleLocked(String),

    #[error("Student {student_id} already has an active application for drive {drive_id}")]
    DuplicateApplication {
        student_id: String,
        drive_id: uuid::Uuid,
    },

    #[error("Cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::BadRequest(_) | Error::Validation(_) | Error::Json(_) => "bad_request",
            Error::Unauthorized(_) => "unauthorized",
            Error::Forbidden(_) => "forbidden",
            Error::NotFound(_) => "not_found",
            Error::NoOp(_) => "no_op",
            Error::LifecycleLocked(_) => "lifecycle_locked",
            Error::DuplicateApplication { .. } => "duplicate_application",
            Error::InvalidTransition { .. } => "invalid_transition",
            Error::Database(_) => "database_error",
            Error::Reqwest(_) => "upstream_error",
            Error::Internal(_) => "internal_error",
        }
    }

    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        Error::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let code = self.code();
        let (status, error_message) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::NoOp(msg) => (StatusCode::CONFLICT, msg),
            Error::LifecycleLocked(msg) => (StatusCode::LOCKED, msg),
            err @ Error::DuplicateApplication { .. } => (StatusCode::CONFLICT, err.to_string()),
            err @ Error::InvalidTransition { .. } => (StatusCode::CONFLICT, err.to_string()),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Json(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Reqwest(err) => (
                StatusCode::BAD_GATEWAY,
                format!("External service error: {}", err),
            ),
            Error::Database(err) => {
                tracing::error!(error = ?err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
            Error::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            Error::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            ),
        };

        let body = Json(json!({ "success": false, "error": error_message, "code": code }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}

/// True when the error is the unique violation raised by the active-application index.
pub fn is_active_application_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.is_unique_violation() && db.constraint() == Some(ACTIVE_APPLICATION_INDEX)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_lock_maps_to_locked_status() {
        let response = Error::LifecycleLocked("drive is blocked".into()).into_response();
        assert_eq!(response.status(), StatusCode::LOCKED);
    }

    #[test]
    fn duplicate_application_is_a_conflict() {
        let err = Error::DuplicateApplication {
            student_id: "stu-1".into(),
            drive_id: uuid::Uuid::nil(),
        };
        assert_eq!(err.code(), "duplicate_application");
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn row_not_found_becomes_not_found() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
