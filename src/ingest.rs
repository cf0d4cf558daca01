//! Offline ingestion: read documents, chunk, embed, store.
//!
//! Best effort. A chunk that fails to embed or store is logged and skipped;
//! the run carries on with the next one. Re-running over the same directory
//! appends duplicates.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use walkdir::WalkDir;

use crate::chunking::{chunk_text, DEFAULT_GROUP_SIZE};
use crate::embeddings::Embedder;
use crate::models::ChunkRecord;
use crate::store::DocumentStore;

/// Totals for one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub files: usize,
    pub chunks_written: usize,
    pub chunks_failed: usize,
}

pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DocumentStore>,
    group_size: usize,
    delay: Duration,
    extensions: Vec<String>,
}

impl Ingestor {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            embedder,
            store,
            group_size: DEFAULT_GROUP_SIZE,
            delay: Duration::ZERO,
            extensions: vec!["md".to_string()],
        }
    }

    /// Sentences per chunk.
    pub fn with_group_size(mut self, group_size: usize) -> Self {
        self.group_size = group_size.max(1);
        self
    }

    /// Pause after each stored chunk, for rate-limited embedding APIs.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// File extensions (without the dot) to pick up.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Ingest every matching file under `source_dir`.
    ///
    /// Only a missing or unreadable directory fails the run.
    pub async fn ingest(&self, source_dir: &Path) -> Result<IngestReport> {
        let files = self.collect_files(source_dir)?;
        tracing::info!("Found {} documents in {}", files.len(), source_dir.display());

        let mut report = IngestReport::default();
        for path in &files {
            let filename = path
                .strip_prefix(source_dir)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");

            let content = match tokio::fs::read_to_string(path).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!("Skipping {filename}: {e}");
                    continue;
                }
            };
            report.files += 1;

            let (written, failed) = self.ingest_document(&filename, &content).await;
            report.chunks_written += written;
            report.chunks_failed += failed;
        }

        tracing::info!(
            "Ingestion finished: {} files, {} chunks written, {} failed",
            report.files,
            report.chunks_written,
            report.chunks_failed
        );
        Ok(report)
    }

    /// Chunk, embed and store one document. Returns (written, failed).
    pub async fn ingest_document(&self, filename: &str, content: &str) -> (usize, usize) {
        let chunks = chunk_text(content, self.group_size);
        tracing::info!("Processing {filename}: {} chunks", chunks.len());

        let mut written = 0usize;
        let mut failed = 0usize;
        for (i, chunk) in chunks.iter().enumerate() {
            match self.store_chunk(filename, i, chunk).await {
                Ok(()) => {
                    written += 1;
                    tracing::debug!("Saved chunk {}/{} of {filename}", i + 1, chunks.len());
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!("Error processing chunk {}/{} of {filename}: {e:#}", i + 1, chunks.len());
                }
            }

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }
        (written, failed)
    }

    async fn store_chunk(&self, filename: &str, index: usize, chunk: &str) -> Result<()> {
        let embedding = self
            .embedder
            .embed(chunk)
            .await
            .context("embedding failed")?;
        let record = ChunkRecord::new(filename, index, chunk, embedding);
        self.store.insert(&record).await.context("insert failed")?;
        Ok(())
    }

    fn collect_files(&self, source_dir: &Path) -> Result<Vec<PathBuf>> {
        anyhow::ensure!(
            source_dir.is_dir(),
            "source directory {} does not exist",
            source_dir.display()
        );

        let mut files = Vec::new();
        for entry in WalkDir::new(source_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        {
            let entry = entry
                .with_context(|| format!("failed to read {}", source_dir.display()))?;
            if entry.file_type().is_file() && self.accepts(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}
