//! Error types for the control API.
//!
//! [`ApiError`] unifies all failure modes of the HTTP layer into a single
//! enum that converts into an Axum response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! error body has the shape `{"error": <message>, "status": <code>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use trafficlight_core::LightError;

/// Errors that can occur in the control API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The caller named a state outside Red, Green, Yellow.
    #[error(transparent)]
    InvalidState(#[from] LightError),

    /// A required query parameter was absent.
    #[error("missing query parameter: {0}")]
    MissingParameter(&'static str),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidState(_) | Self::MissingParameter(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
