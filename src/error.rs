//! Request-scope error taxonomy and its mapping onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::embeddings::EmbeddingError;
use crate::store::StoreError;

/// Errors a request handler can end with.
///
/// An empty result set is not represented here; handlers report it as a
/// successful response with a message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A required request field is missing or blank
    #[error("{0}")]
    Validation(String),

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("document store failed: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Embedding(_) | AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Validation(msg) => json!({ "error": msg }),
            AppError::Embedding(e) => json!({
                "error": "Internal server error",
                "details": e.to_string(),
            }),
            AppError::Store(e) => json!({
                "error": "Internal server error",
                "details": e.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}
