//! RAG Server binary
//!
//! Run with: cargo run -p grounded-rag --bin grounded-rag-server [config.toml]

use std::path::PathBuf;

use grounded_rag::{
    config::{ProviderKind, RagConfig},
    providers::OllamaClient,
    server::RagServer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grounded_rag=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = RagConfig::load(config_path.as_deref())?;
    config.validate()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Provider: {:?}", config.llm.provider);
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);
    tracing::info!("  - LLM model: {}", config.llm.generate_model);
    tracing::info!(
        "  - Chunk size: {} (overlap {})",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    if let Some(timeout) = config.llm.request_timeout() {
        tracing::info!("  - Request timeout: {:?}", timeout);
    }

    if config.llm.provider == ProviderKind::Ollama {
        tracing::info!("Checking Ollama at {}...", config.llm.embed_base_url);
        if OllamaClient::new(&config.llm)?.health_check().await {
            tracing::info!("Ollama is running");
        } else {
            tracing::warn!("Ollama not available at {}", config.llm.embed_base_url);
            tracing::warn!(
                "  Pull models: ollama pull {} && ollama pull {}",
                config.llm.embed_model,
                config.llm.generate_model
            );
        }
    }

    let server = RagServer::new(config)?;

    tracing::info!("Endpoints:");
    tracing::info!("  POST /api/upload    - Upload a document");
    tracing::info!("  POST /api/query     - Ask a question");
    tracing::info!("  GET  /api/documents - List documents");
    tracing::info!("  GET  /health        - Health check");

    server.start().await?;

    Ok(())
}
