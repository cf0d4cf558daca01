//! Postgres + pgvector backend with a native HNSW cosine index.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pgvector::Vector;
use tokio_postgres::{Client, NoTls, Row};

use super::{DocumentStore, StoreError, VectorIndex};
use crate::config::StoreConfig;
use crate::models::{ChunkRecord, ScoredChunk};

/// pgvector rejects `hnsw.ef_search` above this.
const MAX_EF_SEARCH: usize = 1_000;

/// Fully-qualified Postgres table name (schema + table).
#[derive(Debug, Clone)]
pub struct TableName {
    schema: String,
    table: String,
}

impl TableName {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Result<Self, StoreError> {
        let schema = schema.into();
        let table = table.into();
        if schema.trim().is_empty() {
            return Err(StoreError::InvalidValue("schema name is required".to_string()));
        }
        if table.trim().is_empty() {
            return Err(StoreError::InvalidValue("table name is required".to_string()));
        }
        Ok(Self { schema, table })
    }

    /// Fully-qualified table reference with quoted identifiers.
    pub fn qualified(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.table))
    }

    /// Name of the HNSW index over the embedding column.
    pub fn vector_index_name(&self) -> String {
        format!(
            "{}_{}_embedding_hnsw_idx",
            sanitize_ident(&self.schema),
            sanitize_ident(&self.table)
        )
    }
}

/// Quotes Postgres identifiers, escaping embedded quotes.
fn quote_ident(input: &str) -> String {
    format!("\"{}\"", input.replace('"', "\"\""))
}

fn sanitize_ident(input: &str) -> String {
    input
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect()
}

fn create_table_sql(table: &TableName, dims: usize) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (
            id BIGSERIAL PRIMARY KEY,
            filename TEXT NOT NULL,
            chunk_index BIGINT NOT NULL,
            content TEXT NOT NULL,
            embedding VECTOR({dims}) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
        table.qualified()
    )
}

fn create_index_sql(table: &TableName) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS {} ON {} USING hnsw (embedding vector_cosine_ops)",
        table.vector_index_name(),
        table.qualified()
    )
}

fn insert_sql(table: &TableName) -> String {
    format!(
        "INSERT INTO {} (filename, chunk_index, content, embedding, created_at) \
         VALUES ($1, $2, $3, $4, $5)",
        table.qualified()
    )
}

fn select_all_sql(table: &TableName) -> String {
    format!(
        "SELECT filename, chunk_index, content, embedding, created_at FROM {} ORDER BY id",
        table.qualified()
    )
}

/// `<=>` is cosine distance; similarity is reported as `1 - distance`.
fn nearest_sql(table: &TableName) -> String {
    format!(
        "SELECT filename, content, 1 - (embedding <=> $1) AS similarity \
         FROM {} ORDER BY embedding <=> $1 LIMIT $2",
        table.qualified()
    )
}

/// Similarity as read back from `nearest_sql`. pgvector yields NaN for
/// zero-norm vectors; those score 0, as in the in-process cosine.
fn row_similarity(raw: f64) -> f32 {
    if raw.is_nan() {
        0.0
    } else {
        (raw as f32).clamp(-1.0, 1.0)
    }
}

fn ef_search(num_candidates: usize) -> usize {
    num_candidates.clamp(1, MAX_EF_SEARCH)
}

/// Chunk table in Postgres, searched through pgvector's HNSW index.
pub struct PgVectorStore {
    client: Client,
    table: TableName,
    dims: usize,
    insert_sql: String,
    select_all_sql: String,
    nearest_sql: String,
}

impl PgVectorStore {
    /// Connect, then make sure the extension, table and index exist.
    ///
    /// `num_candidates` sets the HNSW candidate list size for the session.
    pub async fn connect(
        config: &StoreConfig,
        dims: usize,
        num_candidates: usize,
    ) -> Result<Self, StoreError> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| StoreError::InvalidValue("DATABASE_URL is not set".to_string()))?;
        if dims == 0 {
            return Err(StoreError::InvalidValue(
                "embedding dimension must be positive".to_string(),
            ));
        }
        let table = TableName::new(config.schema.clone(), config.table.clone())?;

        let (client, connection) = tokio_postgres::connect(url, NoTls)
            .await
            .map_err(StoreError::Connect)?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("Postgres connection error: {e}");
            }
        });

        let store = Self {
            client,
            insert_sql: insert_sql(&table),
            select_all_sql: select_all_sql(&table),
            nearest_sql: nearest_sql(&table),
            table,
            dims,
        };
        store.prepare(num_candidates).await?;
        tracing::info!("Connected to pgvector table {}", store.table.qualified());
        Ok(store)
    }

    async fn prepare(&self, num_candidates: usize) -> Result<(), StoreError> {
        self.client
            .batch_execute("CREATE EXTENSION IF NOT EXISTS vector")
            .await?;
        self.client
            .batch_execute(&create_table_sql(&self.table, self.dims))
            .await?;
        self.client
            .batch_execute(&create_index_sql(&self.table))
            .await?;
        self.client
            .batch_execute(&format!("SET hnsw.ef_search = {}", ef_search(num_candidates)))
            .await?;
        Ok(())
    }
}

fn to_i64(value: usize, field: &str) -> Result<i64, StoreError> {
    i64::try_from(value)
        .map_err(|_| StoreError::InvalidValue(format!("{field} value {value} exceeds i64 range")))
}

fn record_from_row(row: &Row) -> Result<ChunkRecord, StoreError> {
    let chunk_index: i64 = row.try_get("chunk_index")?;
    let embedding: Vector = row.try_get("embedding")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    Ok(ChunkRecord {
        filename: row.try_get("filename")?,
        chunk_index: usize::try_from(chunk_index)
            .map_err(|_| StoreError::InvalidValue(format!("negative chunk_index {chunk_index}")))?,
        content: row.try_get("content")?,
        embedding: embedding.to_vec(),
        created_at,
    })
}

#[async_trait]
impl DocumentStore for PgVectorStore {
    async fn insert(&self, record: &ChunkRecord) -> Result<(), StoreError> {
        if record.embedding.len() != self.dims {
            return Err(StoreError::DimensionMismatch {
                expected: self.dims,
                actual: record.embedding.len(),
            });
        }

        let chunk_index = to_i64(record.chunk_index, "chunk_index")?;
        let vector = Vector::from(record.embedding.clone());
        self.client
            .execute(
                &self.insert_sql,
                &[
                    &record.filename,
                    &chunk_index,
                    &record.content,
                    &vector,
                    &record.created_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn all(&self) -> Result<Vec<ChunkRecord>, StoreError> {
        let rows = self.client.query(&self.select_all_sql, &[]).await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table.qualified());
        let row = self.client.query_one(&sql, &[]).await?;
        let count: i64 = row.try_get(0)?;
        Ok(count.max(0) as usize)
    }
}

#[async_trait]
impl VectorIndex for PgVectorStore {
    async fn vector_search(
        &self,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, StoreError> {
        if query.len() != self.dims {
            return Err(StoreError::DimensionMismatch {
                expected: self.dims,
                actual: query.len(),
            });
        }

        let vector = Vector::from(query.to_vec());
        let limit = to_i64(limit, "limit")?;
        let rows = self
            .client
            .query(&self.nearest_sql, &[&vector, &limit])
            .await?;

        rows.iter()
            .map(|row| -> Result<ScoredChunk, StoreError> {
                let similarity = row_similarity(row.try_get("similarity")?);
                Ok(ScoredChunk {
                    filename: row.try_get("filename")?,
                    content: row.try_get("content")?,
                    similarity,
                })
            })
            .collect()
    }
}
