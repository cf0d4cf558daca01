use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::EmbeddingConfig;

/// Maximum characters of text sent per request to the embedding API.
/// MiniLM-class models truncate at 256-512 tokens anyway; 3 000 chars keeps
/// hosted APIs from rejecting oversized inputs outright.
const MAX_EMBED_CHARS: usize = 3_000;

/// Truncate `text` to its first `MAX_EMBED_CHARS` characters.
fn truncate_for_embedding(text: &str) -> &str {
    match text.char_indices().nth(MAX_EMBED_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("cannot embed empty text")]
    EmptyInput,

    #[error("unknown embedding provider: {0}")]
    UnknownProvider(String),

    #[error("{provider} embedding backend is not configured: {reason}")]
    NotConfigured {
        provider: &'static str,
        reason: String,
    },

    #[error("failed to reach {provider} embedding API: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} embedding API returned {status}: {body}")]
    Api {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed embedding response: {0}")]
    Malformed(String),
}

/// Text to fixed-length vector. The same text always maps to the same
/// vector for a given model.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier, for logs
    fn model(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// Local Ollama server
    Ollama,
    /// OpenAI-compatible `/v1/embeddings`
    OpenAi,
    /// Hugging Face inference API
    HuggingFace,
}

impl EmbeddingProvider {
    pub fn parse(s: &str) -> Result<Self, EmbeddingError> {
        match s.trim().to_lowercase().as_str() {
            "ollama" | "local" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAi),
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            other => Err(EmbeddingError::UnknownProvider(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAi => "OpenAI",
            Self::HuggingFace => "Hugging Face",
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            Self::Ollama => "http://localhost:11434",
            Self::OpenAi => "https://api.openai.com",
            Self::HuggingFace => "https://api-inference.huggingface.co",
        }
    }

    fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

/// HTTP embedding client. Built once at startup and shared behind an `Arc`.
pub struct EmbeddingClient {
    http: reqwest::Client,
    provider: EmbeddingProvider,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl EmbeddingClient {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let provider = EmbeddingProvider::parse(&config.provider)?;

        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);
        if provider.requires_api_key() && api_key.is_none() {
            return Err(EmbeddingError::NotConfigured {
                provider: provider.name(),
                reason: "missing API key".to_string(),
            });
        }
        if config.model.trim().is_empty() {
            return Err(EmbeddingError::NotConfigured {
                provider: provider.name(),
                reason: "missing model name".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|source| EmbeddingError::Transport {
                provider: provider.name(),
                source,
            })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            http,
            provider,
            base_url,
            model: config.model.clone(),
            api_key,
        })
    }

    pub fn provider(&self) -> EmbeddingProvider {
        self.provider
    }

    async fn post_json<B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<serde_json::Value, EmbeddingError> {
        let provider = self.provider.name();
        let mut req = self.http.post(url).json(body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|source| EmbeddingError::Transport { provider, source })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                provider,
                status,
                body,
            });
        }

        resp.json()
            .await
            .map_err(|source| EmbeddingError::Transport { provider, source })
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        let text = truncate_for_embedding(text);

        let embedding = match self.provider {
            EmbeddingProvider::Ollama => self.embed_ollama(text).await?,
            EmbeddingProvider::OpenAi => self.embed_openai(text).await?,
            EmbeddingProvider::HuggingFace => self.embed_huggingface(text).await?,
        };

        if embedding.is_empty() {
            return Err(EmbeddingError::Malformed("empty vector".to_string()));
        }
        Ok(embedding)
    }
}

/// Reduce a JSON embedding payload to one flat vector.
///
/// Accepts a plain array of numbers, or a batched (2-D or deeper) array in
/// which case the first row is used.
pub fn flatten_embedding(value: &serde_json::Value) -> Result<Vec<f32>, EmbeddingError> {
    let array = value
        .as_array()
        .ok_or_else(|| EmbeddingError::Malformed(format!("expected an array, got {value}")))?;

    match array.first() {
        None => Ok(Vec::new()),
        Some(first) if first.is_array() => flatten_embedding(first),
        Some(_) => array
            .iter()
            .map(|v| {
                v.as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| EmbeddingError::Malformed(format!("non-numeric component {v}")))
            })
            .collect(),
    }
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
    truncate: bool,
}

impl EmbeddingClient {
    async fn embed_ollama(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/api/embed", self.base_url);
        let req = OllamaEmbedRequest {
            model: &self.model,
            input: text,
            truncate: true,
        };

        // { "embeddings": [[...]] }
        let body = self.post_json(&url, &req).await?;
        let embeddings = body
            .get("embeddings")
            .ok_or_else(|| EmbeddingError::Malformed("missing 'embeddings' field".to_string()))?;
        flatten_embedding(embeddings)
    }
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiEmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct OpenAiEmbedResponse {
    data: Vec<OpenAiEmbedData>,
}

#[derive(Deserialize)]
struct OpenAiEmbedData {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    async fn embed_openai(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/v1/embeddings", self.base_url);
        let req = OpenAiEmbedRequest {
            model: &self.model,
            input: text,
        };

        let body = self.post_json(&url, &req).await?;
        let parsed: OpenAiEmbedResponse = serde_json::from_value(body)
            .map_err(|e| EmbeddingError::Malformed(format!("OpenAI response: {e}")))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::Malformed("no embedding returned".to_string()))
    }
}

// ─── Hugging Face inference API ──────────────────────────

#[derive(Serialize)]
struct HfEmbedRequest<'a> {
    inputs: &'a str,
}

impl EmbeddingClient {
    async fn embed_huggingface(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/models/{}", self.base_url, self.model);
        let req = HfEmbedRequest { inputs: text };

        // Feature extraction answers with a 1-D vector or a batch of them
        let body = self.post_json(&url, &req).await?;
        flatten_embedding(&body)
    }
}
