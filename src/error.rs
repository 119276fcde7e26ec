//! Error types for the store, the service layer and HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

use crate::types::TaskId;

/// Failure of the underlying persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] refinery::Error),

    #[error("failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("store call aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

/// Outcome of a task service operation that did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TaskError {
    pub fn missing_field(field: &'static str) -> Self {
        Self::Validation {
            field,
            message: format!("{} is required", field),
        }
    }

    pub fn not_found(id: TaskId) -> Self {
        Self::NotFound(id.to_string())
    }

    /// Not-found for a path segment that never parsed as an id.
    pub fn not_found_raw(raw: &str) -> Self {
        Self::NotFound(raw.to_string())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::MissingRequiredField,
            Self::NotFound(_) => ErrorCode::TaskNotFound,
            Self::Storage(_) => ErrorCode::InternalError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingRequiredField,
    InvalidRequestBody,
    TaskNotFound,
    InternalError,
}

/// Structured error body returned to HTTP clients.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Generic body for unexpected failures; carries no internal detail.
    pub fn server_error() -> Self {
        Self::new(ErrorCode::InternalError, "Server error")
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<&TaskError> for ApiError {
    fn from(err: &TaskError) -> Self {
        match err {
            TaskError::Validation { field, message } => {
                ApiError::new(err.code(), message.clone()).with_field(*field)
            }
            TaskError::NotFound(_) => ApiError::new(err.code(), err.to_string()),
            TaskError::Storage(_) => ApiError::server_error(),
        }
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let body = ApiError::from(&self);
        (self.status(), Json(body)).into_response()
    }
}

/// Result type for service operations.
pub type TaskResult<T> = std::result::Result<T, TaskError>;

/// Result type for store operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_do_not_leak_detail() {
        let err = TaskError::Storage(StorageError::Sqlite(rusqlite::Error::InvalidQuery));
        let body = ApiError::from(&err);
        assert_eq!(body.code, ErrorCode::InternalError);
        assert_eq!(body.message, "Server error");
        assert!(body.field.is_none());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_error_names_field() {
        let err = TaskError::missing_field("title");
        let json = serde_json::to_value(ApiError::from(&err)).unwrap();
        assert_eq!(json["code"], "MISSING_REQUIRED_FIELD");
        assert_eq!(json["field"], "title");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = TaskError::not_found(42);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Task not found: 42");
    }
}
