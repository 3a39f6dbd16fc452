//! Error types for playbill-api
//!
//! Missing entities answer with a bare `404 Not Found`; every other failure
//! is a 500 carrying `{"error": {"code", "message"}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// playbill-common error
    #[error("Common error: {0}")]
    Common(#[from] playbill_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (error_code, message) = match self {
            ApiError::NotFound(_) | ApiError::Common(playbill_common::Error::NotFound(_)) => {
                return (StatusCode::NOT_FOUND, "Not Found").into_response();
            }
            ApiError::Common(ref err @ playbill_common::Error::Database(_)) => {
                tracing::error!(error = %err, "Database failure");
                ("DATABASE_ERROR", err.to_string())
            }
            ApiError::Common(ref err) => ("COMMON_ERROR", err.to_string()),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_not_found_is_plain_text() {
        let response = ApiError::Common(playbill_common::Error::NotFound("MATERIAL x".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Not Found");
    }

    #[tokio::test]
    async fn test_common_error_body() {
        let err = playbill_common::Error::InvalidInput("Unknown label: SONG".into());
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"]["code"], "COMMON_ERROR");
        assert_eq!(value["error"]["message"], "Invalid input: Unknown label: SONG");
    }
}
