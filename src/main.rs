use tracing_subscriber::EnvFilter;

use blog_search::api;
use blog_search::config::Config;
use blog_search::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(
        "Embedding provider: {} ({})",
        config.embedding.provider,
        config.embedding.model
    );
    tracing::info!("Retrieval strategy: {:?}", config.retrieval.strategy);

    // Store and embedder failures here end the process
    let state = AppState::new(config.clone()).await?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Server listening on http://{}", config.bind_addr());

    axum::serve(listener, app).await?;
    Ok(())
}
