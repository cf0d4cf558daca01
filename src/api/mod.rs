//! HTTP surface.

pub mod ask;
pub mod search;

use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use crate::error::AppError;
use crate::models::HealthResponse;
use crate::state::AppState;

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Server is running".to_string(),
    })
}

/// Unwrap a JSON body. A missing, unparseable or mistyped body counts as a
/// missing field and becomes a 400 with `missing` as the message.
fn request_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    missing: &str,
) -> Result<T, AppError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            Err(AppError::Validation(missing.to_string()))
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = state.config.cors_origin.as_deref().and_then(cors_layer);

    let app = Router::new()
        .route("/search", post(search::search))
        .route("/ask", post(ask::ask))
        .route("/health", get(health))
        .with_state(state);

    match cors {
        Some(layer) => app.layer(layer),
        None => app,
    }
}

fn cors_layer(origin: &str) -> Option<CorsLayer> {
    match HeaderValue::from_str(origin) {
        Ok(origin) => Some(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        ),
        Err(e) => {
            tracing::warn!("Ignoring invalid CORS_ORIGIN '{origin}': {e}");
            None
        }
    }
}
