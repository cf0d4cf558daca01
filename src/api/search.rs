use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::models::{SearchRequest, SearchResponse};
use crate::state::AppState;

const NO_RESULTS_MESSAGE: &str = "No relevant results found. Try another query.";

/// POST /search - embed the query, fetch the nearest chunks, drop weak and
/// lexically unrelated matches.
pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let req = super::request_body(payload, "Query is required")?;
    let query = req.query.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(AppError::Validation("Query is required".to_string()));
    }

    let results = state.search.search(query).await.map_err(|e| {
        tracing::error!("Search error: {e}");
        e
    })?;

    let message = results.is_empty().then(|| NO_RESULTS_MESSAGE.to_string());
    Ok(Json(SearchResponse {
        success: true,
        message,
        results,
    }))
}
