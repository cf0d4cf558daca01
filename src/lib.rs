//! # blog-search
//!
//! Semantic search over a directory of blog posts, plus an "ask" endpoint
//! that answers by quoting the best-matching passages.
//!
//! ## Pipeline
//!
//! ```text
//!   ingest (offline)                       query (per request)
//!   ────────────────                       ───────────────────
//!   *.md files                              query / question
//!       │                                         │
//!       ▼                                         ▼
//!   sentence chunker (3 per chunk)            Embedder
//!       │                                         │
//!       ▼                                         ▼
//!   Embedder ──► ChunkRecord ──► store ──► Retriever (native | brute force)
//!                                                 │ top k
//!                                                 ▼
//!                                      threshold ≥ 0.65 ► keyword filter
//!                                                 │
//!                                   ┌─────────────┴─────────────┐
//!                                   ▼                           ▼
//!                              /search results          /ask concatenation
//! ```
//!
//! The `/ask` answer is plain string concatenation of the retrieved chunks.
//! No generative model is called anywhere.
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration
//! - [`models`] - `ChunkRecord`, `ScoredChunk`, request/response types
//! - [`chunking`] - Sentence splitting and grouping
//! - [`embeddings`] - `Embedder` trait and the Ollama / OpenAI / Hugging Face client
//! - [`store`] - JSON Lines file store and Postgres + pgvector store
//! - [`search`] - Cosine ranking, retrievers, filters, answer synthesis
//! - [`ingest`] - Directory ingestion
//! - [`api`] - Axum handlers and router
//! - [`state`] - Composition root shared by the handlers

pub mod api;
pub mod chunking;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod ingest;
pub mod models;
pub mod search;
pub mod state;
pub mod store;
