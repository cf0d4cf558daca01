use async_trait::async_trait;
use std::sync::Arc;

use super::vector::rank_by_similarity;
use crate::models::ScoredChunk;
use crate::store::{DocumentStore, StoreError, VectorIndex};

/// Nearest-neighbour lookup over stored chunks, best match first.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>, StoreError>;
}

/// Delegates to the store's own vector index.
pub struct NativeRetriever {
    index: Arc<dyn VectorIndex>,
}

impl NativeRetriever {
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Retriever for NativeRetriever {
    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>, StoreError> {
        self.index.vector_search(query, k).await
    }
}

/// Loads every record and scores it in process. Also serves as the
/// reference ranking for the native path.
pub struct BruteForceRetriever {
    store: Arc<dyn DocumentStore>,
}

impl BruteForceRetriever {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Retriever for BruteForceRetriever {
    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>, StoreError> {
        let records = self.store.all().await?;
        tracing::debug!("Scoring {} stored chunks", records.len());
        rank_by_similarity(query, &records, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChunkRecord;
    use crate::store::MemoryStore;

    /// Index stand-in that answers with whatever the brute-force path ranks.
    struct ScanIndex(Arc<MemoryStore>);

    #[async_trait]
    impl VectorIndex for ScanIndex {
        async fn vector_search(
            &self,
            query: &[f32],
            limit: usize,
        ) -> Result<Vec<ScoredChunk>, StoreError> {
            let records = self.0.all().await?;
            rank_by_similarity(query, &records, limit)
        }
    }

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::ephemeral());
        for (i, v) in [[1.0_f32, 0.0, 0.0], [0.0, 1.0, 0.0], [0.6, 0.8, 0.0]].iter().enumerate() {
            store
                .insert(&ChunkRecord::new("post.md", i, format!("chunk {i}"), v.to_vec()))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_brute_force_top_k() {
        let store = seeded_store().await;
        let retriever = BruteForceRetriever::new(store);

        let hits = retriever.nearest(&[0.0, 1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].content, "chunk 1");
        assert_eq!(hits[1].content, "chunk 2");
    }

    #[tokio::test]
    async fn test_native_matches_brute_force() {
        let store = seeded_store().await;
        let native = NativeRetriever::new(Arc::new(ScanIndex(store.clone())));
        let brute = BruteForceRetriever::new(store);

        let query = [0.5, 0.5, 0.1];
        assert_eq!(
            native.nearest(&query, 3).await.unwrap(),
            brute.nearest(&query, 3).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_brute_force_empty_store() {
        let retriever = BruteForceRetriever::new(Arc::new(MemoryStore::ephemeral()));
        assert!(retriever.nearest(&[1.0, 0.0], 5).await.unwrap().is_empty());
    }
}
