//! Chunk persistence.
//!
//! [`DocumentStore`] is the append/scan surface every backend offers.
//! [`VectorIndex`] is the optional native nearest-neighbour capability;
//! only database-backed stores implement it.

pub mod memory;
pub mod pgvector;

use async_trait::async_trait;

use crate::models::{ChunkRecord, ScoredChunk};

pub use self::memory::MemoryStore;
pub use self::pgvector::{PgVectorStore, TableName};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to connect to database: {0}")]
    Connect(#[source] tokio_postgres::Error),

    #[error("database query failed: {0}")]
    Query(#[from] tokio_postgres::Error),

    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid store value: {0}")]
    InvalidValue(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Append a record. Records are never updated afterwards.
    async fn insert(&self, record: &ChunkRecord) -> Result<(), StoreError>;

    /// Every stored record, in insertion order.
    async fn all(&self) -> Result<Vec<ChunkRecord>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Up to `limit` records nearest to `query`, best first, scored by
    /// cosine similarity.
    async fn vector_search(
        &self,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, StoreError>;
}
