//! Integration tests for the blog-search pipeline.
//!
//! These exercise ingestion, retrieval and the HTTP handlers end to end with
//! a deterministic in-process embedder, so no embedding server or database
//! is needed.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use blog_search::api;
use blog_search::config::Config;
use blog_search::embeddings::{Embedder, EmbeddingError};
use blog_search::ingest::Ingestor;
use blog_search::models::{AskRequest, ChunkRecord, SearchRequest};
use blog_search::search::answer::NO_ANSWER;
use blog_search::search::{BruteForceRetriever, SearchService};
use blog_search::state::AppState;
use blog_search::store::{DocumentStore, MemoryStore};

const VOCAB: [&str; 10] = [
    "cat", "dog", "fish", "mammal", "loyal", "companion", "water", "live", "rust", "memory",
];

/// Bag-of-words embedder over a fixed vocabulary (substring counts).
struct VocabEmbedder;

#[async_trait]
impl Embedder for VocabEmbedder {
    fn model(&self) -> &str {
        "vocab-test"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        let lower = text.to_lowercase();
        Ok(VOCAB.iter().map(|w| lower.matches(w).count() as f32).collect())
    }
}

/// Embedder standing in for an unreachable backend.
struct DownEmbedder;

#[async_trait]
impl Embedder for DownEmbedder {
    fn model(&self) -> &str {
        "down"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Malformed("backend unavailable".to_string()))
    }
}

async fn store_with(texts: &[&str]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::ephemeral());
    for (i, text) in texts.iter().enumerate() {
        let embedding = VocabEmbedder.embed(text).await.unwrap();
        store
            .insert(&ChunkRecord::new("animals.md", i, *text, embedding))
            .await
            .unwrap();
    }
    store
}

fn animal_texts() -> Vec<&'static str> {
    vec![
        "Cats are mammals.",
        "Dogs are loyal companions.",
        "Fish live in water.",
    ]
}

fn state_for(store: Arc<MemoryStore>, embedder: Arc<dyn Embedder>) -> AppState {
    let config = Config::default();
    let retriever = Arc::new(BruteForceRetriever::new(store));
    AppState::from_parts(config, embedder, retriever)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_dogs_query_returns_dogs_chunk_first() {
    let store = store_with(&animal_texts()).await;
    let service = SearchService::new(
        Arc::new(VocabEmbedder),
        Arc::new(BruteForceRetriever::new(store)),
        Config::default().retrieval,
    );

    let results = service.retrieve("Tell me about dogs", 1, 0.0).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].content, "Dogs are loyal companions.");
}

#[tokio::test]
async fn test_results_descending_and_above_threshold() {
    let store = store_with(&[
        "Cats are mammals.",
        "A cat and a dog live together.",
        "Dogs are loyal companions and dogs are mammals.",
        "Fish live in water.",
    ])
    .await;
    let service = SearchService::new(
        Arc::new(VocabEmbedder),
        Arc::new(BruteForceRetriever::new(store)),
        Config::default().retrieval,
    );

    for threshold in [0.0, 0.3, 0.65] {
        let results = service.retrieve("dog mammal", 10, threshold).await.unwrap();
        assert!(results.iter().all(|r| r.similarity >= threshold));
        for pair in results.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
    }
}

#[tokio::test]
async fn test_search_is_repeatable() {
    let store = store_with(&animal_texts()).await;
    let state = state_for(store, Arc::new(VocabEmbedder));

    let request = || SearchRequest {
        query: Some("loyal dogs".to_string()),
    };
    let first = api::search::search(State(state.clone()), Ok(Json(request())))
        .await
        .unwrap();
    let second = api::search::search(State(state), Ok(Json(request())))
        .await
        .unwrap();

    assert!(!first.results.is_empty());
    assert_eq!(first.results, second.results);
}

#[tokio::test]
async fn test_search_empty_store_is_success() {
    let state = state_for(Arc::new(MemoryStore::ephemeral()), Arc::new(VocabEmbedder));

    let response = api::search::search(
        State(state),
        Ok(Json(SearchRequest {
            query: Some("anything about cats".to_string()),
        })),
    )
    .await
    .unwrap();

    assert!(response.success);
    assert!(response.results.is_empty());
    assert!(response.message.is_some());
}

#[tokio::test]
async fn test_search_missing_query_is_400() {
    let state = state_for(store_with(&animal_texts()).await, Arc::new(VocabEmbedder));

    let response = api::search::search(State(state), Ok(Json(SearchRequest { query: None })))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn test_ask_missing_question_is_400() {
    let state = state_for(store_with(&animal_texts()).await, Arc::new(VocabEmbedder));

    let response = api::ask::ask(
        State(state),
        Ok(Json(AskRequest {
            question: Some("   ".to_string()),
        })),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ask_below_threshold_returns_fixed_message() {
    let state = state_for(store_with(&animal_texts()).await, Arc::new(VocabEmbedder));

    // Shares "dogs" with one chunk, but only weakly (cosine ~0.58 < 0.65)
    let response = api::ask::ask(
        State(state),
        Ok(Json(AskRequest {
            question: Some("Tell me about dogs".to_string()),
        })),
    )
    .await
    .unwrap();

    assert!(response.success);
    assert_eq!(response.answer, NO_ANSWER);
    assert!(response.sources.is_empty());
}

#[tokio::test]
async fn test_ask_quotes_matching_chunk() {
    let state = state_for(store_with(&animal_texts()).await, Arc::new(VocabEmbedder));

    let response = api::ask::ask(
        State(state),
        Ok(Json(AskRequest {
            question: Some("Are dogs loyal companions?".to_string()),
        })),
    )
    .await
    .unwrap();

    assert_eq!(response.sources.len(), 1);
    assert_eq!(
        response.answer,
        "Based on the top sources: Dogs are loyal companions."
    );
}

#[tokio::test]
async fn test_embedding_failure_is_500_with_details() {
    let state = state_for(store_with(&animal_texts()).await, Arc::new(DownEmbedder));

    let response = api::search::search(
        State(state),
        Ok(Json(SearchRequest {
            query: Some("dogs".to_string()),
        })),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Internal server error");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("backend unavailable"));
}

#[tokio::test]
async fn test_health() {
    let Json(health) = api::health().await;
    assert_eq!(health.status, "OK");
}

#[tokio::test]
async fn test_ingest_then_search_through_file_store() {
    let posts = tempfile::tempdir().unwrap();
    std::fs::write(
        posts.path().join("pets.md"),
        "Dogs are loyal companions. Dogs love long walks. Dogs guard the house.\n\n\
         Fish live in water. Fish need clean tanks. Fish are quiet pets.",
    )
    .unwrap();

    let data = tempfile::tempdir().unwrap();
    let store_path = data.path().join("chunks.jsonl");
    let writer = Arc::new(MemoryStore::open_or_create(&store_path).unwrap());
    let report = Ingestor::new(Arc::new(VocabEmbedder), writer)
        .ingest(posts.path())
        .await
        .unwrap();
    assert_eq!(report.files, 1);
    assert_eq!(report.chunks_written, 2);
    assert_eq!(report.chunks_failed, 0);

    // A separate handle, as the server process would open it
    let reader = Arc::new(MemoryStore::open_or_create(&store_path).unwrap());
    let state = state_for(reader, Arc::new(VocabEmbedder));
    let response = api::search::search(
        State(state),
        Ok(Json(SearchRequest {
            query: Some("fish water".to_string()),
        })),
    )
    .await
    .unwrap();

    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].filename, "pets.md");
    assert!(response.results[0].content.starts_with("Fish live in water."));
}

/// Serve the full router on an ephemeral port and return its base URL.
async fn spawn_server(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, api::router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_router_bad_bodies_are_400_json() {
    let state = state_for(store_with(&animal_texts()).await, Arc::new(VocabEmbedder));
    let base = spawn_server(state).await;
    let client = reqwest::Client::new();

    let cases = [
        ("/search", None, "Query is required"),
        ("/search", Some(""), "Query is required"),
        ("/search", Some(r#"{"query":5}"#), "Query is required"),
        ("/search", Some("{}"), "Query is required"),
        ("/ask", None, "Question is required"),
        ("/ask", Some("not json"), "Question is required"),
    ];

    for (path, body, message) in cases {
        let mut req = client.post(format!("{base}{path}"));
        if let Some(body) = body {
            req = req
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.to_string());
        }
        let resp = req.send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST, "{path} {body:?}");

        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["error"], message, "{path} {body:?}");
    }
}

#[tokio::test]
async fn test_router_serves_search_and_health() {
    let state = state_for(store_with(&animal_texts()).await, Arc::new(VocabEmbedder));
    let base = spawn_server(state).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/search"))
        .json(&serde_json::json!({ "query": "loyal dogs" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["results"][0]["content"], "Dogs are loyal companions.");

    let resp = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "OK");
}
