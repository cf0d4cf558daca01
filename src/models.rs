use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single embedded chunk of a source document. Written once at ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChunkRecord {
    /// Source document, relative to the ingestion directory
    pub filename: String,
    /// Position within the source; traceability only
    pub chunk_index: usize,
    pub content: String,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

impl ChunkRecord {
    pub fn new(
        filename: impl Into<String>,
        chunk_index: usize,
        content: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            filename: filename.into(),
            chunk_index,
            content: content.into(),
            embedding,
            created_at: Utc::now(),
        }
    }
}

/// A chunk paired with its similarity to the query. Built per request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredChunk {
    pub filename: String,
    pub content: String,
    pub similarity: f32,
}

/// Search request. `query` is optional so a missing field maps to 400, not 422.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
}

/// Ask request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
}

/// Search response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub results: Vec<ScoredChunk>,
}

/// Ask response. `answer` is concatenated source text, never generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub success: bool,
    pub answer: String,
    pub sources: Vec<ScoredChunk>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}
