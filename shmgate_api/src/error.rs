//! Request failures and their HTTP rendering.
//!
//! Every failure maps to `500 {"err": "<message>"}`.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use shmgate_segment::ShmError;
use thiserror::Error;
use tracing::warn;

/// Error returned by request handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Segment operation failed
    #[error(transparent)]
    Segment(#[from] ShmError),

    /// Body missing, not JSON, or missing fields
    #[error("Invalid request body: {0}")]
    Body(#[from] JsonRejection),

    /// Path segment is not an integer
    #[error("Invalid {name} in path: '{value}'")]
    Path {
        /// Parameter name
        name: &'static str,
        /// Rejected text
        value: String,
    },

    /// Blocking worker did not complete
    #[error("Request worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        warn!("Request failed: {}", message);
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "err": message }))).into_response()
    }
}

/// Result type for request handlers
pub type ApiResult<T> = Result<T, ApiError>;
