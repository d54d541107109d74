use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Error taxonomy of the HTTP surface. Every failure a handler can produce
/// maps to exactly one of these, and every response body is
/// `{"error": <string>}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad input: missing required field, disallowed sheet name.
    #[error("{0}")]
    Validation(String),

    /// Credential mismatch.
    #[error("{0}")]
    Auth(String),

    /// No record with the given identifier (or no such sheet).
    #[error("{0}")]
    NotFound(String),

    /// The backend call was rejected or threw. Never retried.
    #[error("{0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SheetMissing(name) => {
                ApiError::NotFound(format!("hoja '{name}' no encontrada"))
            }
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Upstream(diagnostic) = &self {
            log::error!("upstream failure: {diagnostic}");
        }
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
