use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Rejections raised while composing or validating a request.
///
/// These never reach the network or the history store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("URL is required")]
    UrlRequired,

    #[error("Invalid URL format")]
    InvalidUrl,

    #[error("Invalid HTTP method")]
    InvalidMethod,

    #[error("Invalid JSON in request body")]
    InvalidJsonBody,
}

/// Failures of the history store collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json encode/decode failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("invalid method value: {0}")]
    InvalidMethod(String),

    #[error("history store lock poisoned")]
    LockPoisoned,

    #[error("request {0} not found")]
    NotFound(i64),

    #[error("store task failed: {0}")]
    Join(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Store failure, with the message shown to the caller.
    #[error("{message}")]
    Store {
        message: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Request not found")]
    NotFound,

    /// Request body that is not JSON or does not fit the payload shape.
    #[error("{message}")]
    Payload { status: StatusCode, message: String },
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Payload {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl AppError {
    pub fn store(message: &'static str, source: StoreError) -> Self {
        match source {
            StoreError::NotFound(_) => AppError::NotFound,
            source => AppError::Store { message, source },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store { source, .. } => {
                tracing::error!(error = %source, "History store failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Payload { status, .. } => *status,
        };

        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::UrlRequired.to_string(), "URL is required");
        assert_eq!(ValidationError::InvalidUrl.to_string(), "Invalid URL format");
        assert_eq!(
            ValidationError::InvalidMethod.to_string(),
            "Invalid HTTP method"
        );
    }

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err = AppError::store("Failed to fetch request details", StoreError::NotFound(7));
        assert!(matches!(err, AppError::NotFound));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_failure_status() {
        let err = AppError::store("Failed to record request", StoreError::LockPoisoned);
        assert_eq!(err.to_string(), "Failed to record request");
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
