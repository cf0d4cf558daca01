//! Pseudo-answers for `/ask`.
//!
//! Nothing here calls a language model. The "answer" is the retrieved chunk
//! texts, in ranked order, glued under a fixed prefix.

use crate::models::ScoredChunk;

pub const ANSWER_PREFIX: &str = "Based on the top sources: ";

/// Returned when no chunk survives filtering.
pub const NO_ANSWER: &str = "No relevant information found for this question.";

pub fn synthesize(sources: &[ScoredChunk]) -> String {
    if sources.is_empty() {
        return NO_ANSWER.to_string();
    }

    let context = sources
        .iter()
        .map(|s| s.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{ANSWER_PREFIX}{context}")
}
