use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host part of the listen address
    pub bind_host: String,
    /// HTTP port
    pub port: u16,
    /// Where the JSON chunk store lives when no database is configured
    pub data_dir: PathBuf,
    /// Document store configuration
    pub store: StoreConfig,
    /// Embedding backend configuration
    pub embedding: EmbeddingConfig,
    /// Ranking and filtering policy
    pub retrieval: RetrievalConfig,
    /// Browser origin allowed to call the API (the web UI)
    pub cors_origin: Option<String>,
    /// Pause between chunk embeddings during ingestion, in milliseconds
    pub ingest_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Postgres connection string. None selects the JSON file store.
    pub database_url: Option<String>,
    /// Schema holding the chunk table
    pub schema: String,
    /// Chunk table name
    pub table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "ollama", "openai" or "huggingface"
    pub provider: String,
    /// Base URL for the embedding API. None uses the provider default.
    pub base_url: Option<String>,
    /// Model identifier
    pub model: String,
    /// API key (only needed for hosted providers)
    pub api_key: Option<String>,
    /// Embedding vector dimension
    pub dim: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStrategy {
    /// Delegate nearest-neighbour search to the database's vector index
    Native,
    /// Score every stored record in process
    BruteForce,
}

impl RetrievalStrategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "native" | "vector_index" => Some(Self::Native),
            "brute_force" | "brute-force" | "scan" => Some(Self::BruteForce),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub strategy: RetrievalStrategy,
    /// Results scoring below this are dropped
    pub similarity_threshold: f32,
    /// Drop results sharing no query token
    pub keyword_filter: bool,
    pub search_top_k: usize,
    pub ask_top_k: usize,
    /// Candidate list size for the native index (over-fetch for recall)
    pub num_candidates: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            store: StoreConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            cors_origin: Some("http://localhost:3000".to_string()),
            ingest_delay_ms: 0,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            schema: "public".to_string(),
            table: "blog_chunks".to_string(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: None,
            model: "all-minilm".to_string(),
            api_key: None,
            dim: 384,
            timeout_secs: 30,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            strategy: RetrievalStrategy::BruteForce,
            similarity_threshold: 0.65,
            keyword_filter: true,
            search_top_k: 5,
            ask_top_k: 3,
            num_candidates: 200,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unparseable values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("BIND_HOST") {
            config.bind_host = host;
        }
        if let Some(v) = lookup("PORT").and_then(|v| v.parse().ok()) {
            config.port = v;
        }
        if let Some(dir) = lookup("BLOG_SEARCH_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(origin) = lookup("CORS_ORIGIN") {
            config.cors_origin = if origin.trim().is_empty() { None } else { Some(origin) };
        }
        if let Some(v) = lookup("INGEST_DELAY_MS").and_then(|v| v.parse().ok()) {
            config.ingest_delay_ms = v;
        }

        // Store
        if let Some(url) = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty()) {
            config.store.database_url = Some(url);
        }
        if let Some(schema) = lookup("DB_NAME") {
            config.store.schema = schema;
        }
        if let Some(table) = lookup("COLLECTION_NAME") {
            config.store.table = table;
        }

        // Embeddings
        if let Some(provider) = lookup("EMBEDDING_PROVIDER") {
            config.embedding.provider = provider;
        }
        if let Some(url) = lookup("EMBEDDING_BASE_URL") {
            config.embedding.base_url = Some(url);
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            config.embedding.model = model;
        }
        config.embedding.api_key = lookup("EMBEDDING_API_KEY")
            .or_else(|| lookup("OPENAI_API_KEY"))
            .or_else(|| lookup("HF_API_KEY"));
        if let Some(v) = lookup("EMBEDDING_DIM").and_then(|v| v.parse().ok()) {
            config.embedding.dim = v;
        }
        if let Some(v) = lookup("EMBEDDING_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.embedding.timeout_secs = v;
        }

        // Retrieval
        let default_strategy = config.default_strategy();
        config.retrieval.strategy = match lookup("RETRIEVAL_STRATEGY") {
            Some(s) => RetrievalStrategy::parse(&s).unwrap_or_else(|| {
                tracing::warn!("Unknown RETRIEVAL_STRATEGY '{s}', using default");
                default_strategy
            }),
            None => default_strategy,
        };
        if let Some(raw) = lookup("SIMILARITY_THRESHOLD") {
            match raw.trim().parse::<f32>() {
                Ok(v) if v.is_finite() => config.retrieval.similarity_threshold = v.clamp(0.0, 1.0),
                _ => tracing::warn!("Invalid SIMILARITY_THRESHOLD '{raw}', using default"),
            }
        }
        if let Some(v) = lookup("KEYWORD_FILTER") {
            config.retrieval.keyword_filter = parse_bool(&v).unwrap_or(true);
        }
        if let Some(v) = lookup("SEARCH_TOP_K").and_then(|v| v.parse::<usize>().ok()) {
            config.retrieval.search_top_k = v.max(1);
        }
        if let Some(v) = lookup("ASK_TOP_K").and_then(|v| v.parse::<usize>().ok()) {
            config.retrieval.ask_top_k = v.max(1);
        }
        if let Some(v) = lookup("NUM_CANDIDATES").and_then(|v| v.parse().ok()) {
            config.retrieval.num_candidates = v;
        }

        config
    }

    /// Native search when a database is configured, in-process scan otherwise.
    fn default_strategy(&self) -> RetrievalStrategy {
        if self.store.database_url.is_some() {
            RetrievalStrategy::Native
        } else {
            RetrievalStrategy::BruteForce
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }

    pub fn chunks_path(&self) -> PathBuf {
        self.data_dir.join("chunks.jsonl")
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
