use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::models::{AskRequest, AskResponse};
use crate::state::AppState;

/// POST /ask - same retrieval as `/search`, then the surviving chunk texts
/// are concatenated into the answer. No language model is involved.
pub async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let req = super::request_body(payload, "Question is required")?;
    let question = req.question.as_deref().map(str::trim).unwrap_or_default();
    if question.is_empty() {
        return Err(AppError::Validation("Question is required".to_string()));
    }

    let answer = state.search.ask(question).await.map_err(|e| {
        tracing::error!("Ask error: {e}");
        e
    })?;

    Ok(Json(AskResponse {
        success: true,
        answer: answer.answer,
        sources: answer.sources,
    }))
}
