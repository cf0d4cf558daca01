//! Query-time pipeline: embed the query, fetch nearest chunks, filter.

pub mod answer;
pub mod filter;
pub mod retriever;
pub mod vector;

use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::embeddings::Embedder;
use crate::error::AppError;
use crate::models::ScoredChunk;

pub use self::retriever::{BruteForceRetriever, NativeRetriever, Retriever};

/// Outcome of an ask: the pseudo-answer and the chunks it was built from.
#[derive(Debug, Clone)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<ScoredChunk>,
}

/// Retrieval service shared by the HTTP handlers.
pub struct SearchService {
    embedder: Arc<dyn Embedder>,
    retriever: Arc<dyn Retriever>,
    policy: RetrievalConfig,
}

impl SearchService {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        retriever: Arc<dyn Retriever>,
        policy: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            retriever,
            policy,
        }
    }

    /// Top `k` chunks for `query`, best first, with every result at or above
    /// `threshold`. The keyword filter runs afterwards when enabled. An empty
    /// vec is a normal outcome.
    pub async fn retrieve(
        &self,
        query: &str,
        k: usize,
        threshold: f32,
    ) -> Result<Vec<ScoredChunk>, AppError> {
        tracing::debug!("Generating embedding for query with {}", self.embedder.model());
        let query_embedding = self.embedder.embed(query).await?;

        let hits = self.retriever.nearest(&query_embedding, k).await?;
        let found = hits.len();

        let mut results = filter::apply_threshold(hits, threshold);
        let above_threshold = results.len();
        if self.policy.keyword_filter {
            results = filter::apply_keyword_filter(results, query);
        }

        tracing::info!(
            "Retrieved {found} chunks, {above_threshold} above {threshold}, {} after keyword filter",
            results.len()
        );
        Ok(results)
    }

    /// `/search` with the configured k and threshold.
    pub async fn search(&self, query: &str) -> Result<Vec<ScoredChunk>, AppError> {
        self.retrieve(query, self.policy.search_top_k, self.policy.similarity_threshold)
            .await
    }

    /// `/ask`: retrieval followed by [`answer::synthesize`].
    pub async fn ask(&self, question: &str) -> Result<Answer, AppError> {
        let sources = self
            .retrieve(question, self.policy.ask_top_k, self.policy.similarity_threshold)
            .await?;
        Ok(Answer {
            answer: answer::synthesize(&sources),
            sources,
        })
    }
}
