use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use blog_search::chunking::DEFAULT_GROUP_SIZE;
use blog_search::config::Config;
use blog_search::embeddings::EmbeddingClient;
use blog_search::ingest::Ingestor;
use blog_search::state::StoreHandle;

#[derive(Parser, Debug)]
#[command(
    name = "blog-search-ingest",
    about = "Chunk, embed and store every blog post in a directory"
)]
struct IngestCli {
    /// Directory holding the posts
    #[arg(long, env = "BLOG_SOURCE_DIR", default_value = "data/blog")]
    source_dir: PathBuf,

    /// Sentences per chunk
    #[arg(long, default_value_t = DEFAULT_GROUP_SIZE)]
    group_size: usize,

    /// Pause between chunks in milliseconds (defaults to INGEST_DELAY_MS)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// File extensions to ingest
    #[arg(long = "ext", default_values_t = vec!["md".to_string()])]
    extensions: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = IngestCli::parse();
    let config = Config::from_env();

    let embedder = Arc::new(
        EmbeddingClient::new(&config.embedding).context("failed to set up embedding client")?,
    );
    let store = StoreHandle::open(&config).await?;

    let delay = Duration::from_millis(cli.delay_ms.unwrap_or(config.ingest_delay_ms));
    let ingestor = Ingestor::new(embedder, store.documents())
        .with_group_size(cli.group_size)
        .with_delay(delay)
        .with_extensions(cli.extensions);

    let report = ingestor.ingest(&cli.source_dir).await?;
    println!(
        "Ingested {} file{}: {} chunk{} written, {} failed.",
        report.files,
        if report.files == 1 { "" } else { "s" },
        report.chunks_written,
        if report.chunks_written == 1 { "" } else { "s" },
        report.chunks_failed
    );
    Ok(())
}
