//! Error types for the Reframing Room webhook server.

use axum::response::IntoResponse;
use thiserror::Error;

/// Main error type for API operations.
#[derive(Error, Debug)]
pub enum ApiError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Outbound HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Text-generation service answered with a non-success status.
    #[error("Upstream error ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// Text-generation service answered with an unusable payload.
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Core error.
    #[error("Core error: {0}")]
    Core(#[from] reframe_core::Error),
}

/// Result alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Convert to HTTP status code.
    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            ApiError::Json(_) => axum::http::StatusCode::BAD_REQUEST,
            ApiError::Http(_) | ApiError::Upstream { .. } | ApiError::InvalidResponse(_) => {
                axum::http::StatusCode::BAD_GATEWAY
            }
            ApiError::Io(_) | ApiError::Internal(_) | ApiError::Core(_) => {
                axum::http::StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ApiError> for axum::response::Response {
    fn from(error: ApiError) -> Self {
        let status = error.status_code();
        let body = serde_json::json!({
            "error": error.to_string(),
            "code": status.as_u16(),
        });
        (status, axum::Json(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn storage_failures_map_to_internal_server_error() {
        let err = ApiError::from(reframe_core::Error::storage("disk full"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn upstream_failures_map_to_bad_gateway() {
        let err = ApiError::Upstream {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("429"));
    }
}
