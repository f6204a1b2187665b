//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::db::repository::RepositoryError;
use crate::storage::StorageError;

/// Error response body: `{message, error?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
    /// Underlying cause, present on server-side failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request; the message is shown to the client as-is.
    BadRequest(String),
    NotFound(String),
    /// Server-side failure with a caller-facing summary.
    Internal { message: String, error: String },
    /// Repository failure during the operation named by `message`.
    Repository {
        message: &'static str,
        source: RepositoryError,
    },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Wrap a repository error with the summary for the failing operation.
    pub fn repository(message: &'static str, source: RepositoryError) -> Self {
        Self::Repository { message, source }
    }

    pub fn storage(message: impl Into<String>, source: StorageError) -> Self {
        Self::Internal {
            message: message.into(),
            error: source.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::new(msg)),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new(msg)),
            AppError::Internal { message, error: cause } => {
                error!(%message, error = %cause, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new(message).with_error(cause),
                )
            }
            AppError::Repository { message, source } => {
                if source.is_client_error() {
                    (StatusCode::BAD_REQUEST, ApiError::new(source.to_string()))
                } else if matches!(source, RepositoryError::NotFound { .. }) {
                    (StatusCode::NOT_FOUND, ApiError::new(source.to_string()))
                } else {
                    error!(%message, error = %source, "Request failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiError::new(message).with_error(source.to_string()),
                    )
                }
            }
        };

        (status, Json(body)).into_response()
    }
}
