//! HTTP error mapping
//!
//! Every error response carries `{"detail": "..."}`.

use annotator_core::{AnnotatorError, ErrorResponse, PayloadError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Body parsed as JSON but has the wrong shape.
    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("Malformed JSON body: {0}")]
    MalformedBody(String),

    /// Storage engine failure. Logged, not echoed to the client.
    #[error(transparent)]
    Storage(#[from] AnnotatorError),

    #[error("Database unavailable: {0}")]
    Unavailable(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::Payload(_) | ApiError::MalformedBody(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::Storage(e) => {
                tracing::error!("Storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            ApiError::Unavailable(e) => {
                tracing::warn!("Health check failed: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Database unavailable".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(detail))).into_response()
    }
}
