use anyhow::Context;
use std::sync::Arc;

use crate::config::{Config, RetrievalStrategy};
use crate::embeddings::{Embedder, EmbeddingClient};
use crate::search::{BruteForceRetriever, NativeRetriever, Retriever, SearchService};
use crate::store::{DocumentStore, MemoryStore, PgVectorStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub search: Arc<SearchService>,
}

/// The concrete store picked from configuration. The pgvector store also
/// offers native vector search.
pub enum StoreHandle {
    Memory(Arc<MemoryStore>),
    PgVector(Arc<PgVectorStore>),
}

impl StoreHandle {
    /// Connect to Postgres when `DATABASE_URL` is set, else open the file store.
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        if config.store.database_url.is_some() {
            let store = PgVectorStore::connect(
                &config.store,
                config.embedding.dim,
                config.retrieval.num_candidates.max(config.retrieval.search_top_k),
            )
            .await
            .context("failed to open pgvector store")?;
            Ok(Self::PgVector(Arc::new(store)))
        } else {
            let path = config.chunks_path();
            let store = MemoryStore::open_or_create(&path)
                .with_context(|| format!("failed to open chunk store at {}", path.display()))?;
            tracing::info!("Using file chunk store at {}", path.display());
            Ok(Self::Memory(Arc::new(store)))
        }
    }

    pub fn documents(&self) -> Arc<dyn DocumentStore> {
        match self {
            Self::Memory(s) => s.clone(),
            Self::PgVector(s) => s.clone(),
        }
    }

    /// Retriever for `strategy`. Native search needs a database-backed store.
    pub fn retriever(&self, strategy: RetrievalStrategy) -> anyhow::Result<Arc<dyn Retriever>> {
        match (strategy, self) {
            (RetrievalStrategy::Native, Self::PgVector(s)) => {
                Ok(Arc::new(NativeRetriever::new(s.clone())))
            }
            (RetrievalStrategy::Native, Self::Memory(_)) => {
                anyhow::bail!("native vector search requires DATABASE_URL")
            }
            (RetrievalStrategy::BruteForce, _) => {
                Ok(Arc::new(BruteForceRetriever::new(self.documents())))
            }
        }
    }
}

impl AppState {
    /// Composition root: build the embedding client and store once and wire
    /// them into the search service. Any failure here is fatal.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let embedder: Arc<dyn Embedder> = Arc::new(
            EmbeddingClient::new(&config.embedding).context("failed to set up embedding client")?,
        );
        let store = StoreHandle::open(&config).await?;
        let retriever = store.retriever(config.retrieval.strategy)?;

        Ok(Self::from_parts(config, embedder, retriever))
    }

    pub fn from_parts(
        config: Config,
        embedder: Arc<dyn Embedder>,
        retriever: Arc<dyn Retriever>,
    ) -> Self {
        let search = SearchService::new(embedder, retriever, config.retrieval.clone());
        Self {
            config: Arc::new(config),
            search: Arc::new(search),
        }
    }
}
