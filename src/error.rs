//! HTTP error type shared by all route handlers.
//!
//! Failures are rendered as `{ "error": ..., "message": ... }`. Backend and
//! model problems are logged in full but shown to the client as a short,
//! user-facing message.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::flows::FlowError;

// ---

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Body or path that could not be decoded into the handler's type.
    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

/// JSON body extractor whose rejections render as [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejections render as [`ApiError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_)
            | ApiError::Malformed(_)
            | ApiError::Flow(FlowError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Flow(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NotFound",
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::Malformed(_) | ApiError::Flow(FlowError::InvalidInput(_)) => {
                "ValidationError"
            }
            ApiError::Flow(_) => "AssistantUnavailable",
            ApiError::Internal(_) => "InternalServerError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        let status = self.status_code();
        let error = self.error_type();

        let message = match &self {
            ApiError::Flow(FlowError::InvalidInput(v)) => {
                tracing::debug!(error = %self, "Rejected flow input");
                format!("Invalid input: {}", v)
            }
            ApiError::Flow(_) => {
                tracing::error!(error = %self, "Flow call failed");
                "The assistant could not complete this request. Please try again.".to_string()
            }
            ApiError::Internal(_) => {
                tracing::error!(error = %self, "Internal error");
                "An internal error occurred".to_string()
            }
            _ => {
                tracing::debug!(error = %self, "Client error");
                self.to_string()
            }
        };

        (status, Json(ErrorResponse { error, message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::flows::Violation;

    #[test]
    fn test_error_status_codes() {
        // ---
        assert_eq!(
            ApiError::NotFound("alert".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(FlowError::InvalidInput(Violation::new("quantity", "too small")))
                .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(FlowError::Transport("refused".to_string())).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(FlowError::MalformedOutput("eof".to_string())).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_error_types() {
        // ---
        assert_eq!(ApiError::NotFound("x".to_string()).error_type(), "NotFound");
        assert_eq!(
            ApiError::Malformed("missing field `location`".to_string()).error_type(),
            "ValidationError"
        );
        assert_eq!(
            ApiError::from(FlowError::Service {
                status: 500,
                body: String::new()
            })
            .error_type(),
            "AssistantUnavailable"
        );
    }
}
