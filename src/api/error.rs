use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::secrets::SecretsError;

/// Request-level failure. Every variant answers `{"error": "<message>"}`.
#[derive(Debug)]
pub enum ApiError {
    /// Backend read failed; the backend's message is passed through unchanged.
    Backend(String),
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Backend(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Backend(msg) | ApiError::Internal(msg) => msg,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let error = match self {
            ApiError::Backend(msg) | ApiError::Internal(msg) => msg,
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<SecretsError> for ApiError {
    fn from(err: SecretsError) -> Self {
        match err {
            SecretsError::NotInitialized | SecretsError::Closed => {
                ApiError::Internal(err.to_string())
            }
            other => ApiError::Backend(other.to_string()),
        }
    }
}
