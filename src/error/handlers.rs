//! Error handlers
//!
//! Converts core errors into HTTP responses for the request layer.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use serde_json::json;

use crate::error::types::MediaError;

/// Convert error to HTTP status code
pub fn error_to_status_code(err: &MediaError) -> StatusCode {
    match err {
        MediaError::InvalidPath(_) => StatusCode::BAD_REQUEST,
        MediaError::Decode(_) => StatusCode::BAD_REQUEST,
        MediaError::NotFound(_) => StatusCode::NOT_FOUND,
        MediaError::Index(_) => StatusCode::INTERNAL_SERVER_ERROR,
        MediaError::Archive { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        MediaError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Log a media error at a level matching who caused it
pub fn handle_error(err: &MediaError) {
    match error_to_status_code(err) {
        status if status.is_server_error() => error!("Media server error: {}", err),
        _ => warn!("Rejected request: {}", err),
    }
}

impl IntoResponse for MediaError {
    fn into_response(self) -> Response {
        handle_error(&self);
        let status = error_to_status_code(&self);
        let body = json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
