use std::cmp::Ordering;

use crate::models::{ChunkRecord, ScoredChunk};
use crate::store::StoreError;

/// Cosine similarity in [-1, 1]. Zero when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for i in 0..a.len() {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        (dot / denom).clamp(-1.0, 1.0)
    }
}

/// Score every record against `query` and keep the `limit` best.
///
/// The sort is stable, so equal scores keep store order. Any record whose
/// dimension differs from the query is an error.
pub fn rank_by_similarity(
    query: &[f32],
    records: &[ChunkRecord],
    limit: usize,
) -> Result<Vec<ScoredChunk>, StoreError> {
    let mut scored: Vec<(f32, &ChunkRecord)> = Vec::with_capacity(records.len());
    for record in records {
        if record.embedding.len() != query.len() {
            return Err(StoreError::DimensionMismatch {
                expected: record.embedding.len(),
                actual: query.len(),
            });
        }
        scored.push((cosine_similarity(query, &record.embedding), record));
    }

    // Sort descending by score
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored.truncate(limit);

    Ok(scored
        .into_iter()
        .map(|(similarity, r)| ScoredChunk {
            filename: r.filename.clone(),
            content: r.content.clone(),
            similarity,
        })
        .collect())
}
