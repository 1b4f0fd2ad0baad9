use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use spamguard_ai::ModelError;
use thiserror::Error;
use tracing::error;

/// Everything a request can fail with.
///
/// Client errors carry a short message; every other failure collapses to a
/// generic 500 and the detail stays in the server log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Text is required")]
    TextRequired,

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("unreadable request: {0}")]
    BadBody(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::TextRequired => StatusCode::BAD_REQUEST,
            Self::Model(_) | Self::BadBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
