//! HTTP mapping for queue errors

use crate::error::QueueError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

impl QueueError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            QueueError::Validation { .. } => StatusCode::BAD_REQUEST,
            QueueError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for QueueError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": self.code(),
            "message": self.to_string(),
        }));
        (self.status_code(), body).into_response()
    }
}

/// A request body that is not valid JSON for the endpoint is a validation failure.
impl From<JsonRejection> for QueueError {
    fn from(rejection: JsonRejection) -> Self {
        QueueError::validation(rejection.body_text())
    }
}
