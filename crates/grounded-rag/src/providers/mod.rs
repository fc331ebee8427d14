//! Provider abstractions for embeddings and completions
//!
//! Both capabilities are narrow traits so that the ingestion pipeline and
//! query engine can run against remote services or in-process stubs.

pub mod embedding;
pub mod llm;
pub mod ollama;
pub mod openai;

use std::sync::Arc;

pub use embedding::EmbeddingProvider;
pub use llm::CompletionProvider;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use crate::config::{LlmConfig, ProviderKind};
use crate::error::Result;

/// Shared embedding and completion providers
pub type Providers = (Arc<dyn EmbeddingProvider>, Arc<dyn CompletionProvider>);

/// Build the providers selected by the config
pub fn build_providers(config: &LlmConfig) -> Result<Providers> {
    match config.provider {
        ProviderKind::OpenAi => {
            let embedder = OpenAiClient::embeddings(config)?;
            let completer = OpenAiClient::completions(config)?;
            tracing::info!(
                "Using OpenAI-compatible providers (embed: {} at {}, generate: {} at {})",
                config.embed_model,
                config.embed_base_url,
                config.generate_model,
                config.generate_base_url
            );
            let embedder: Arc<dyn EmbeddingProvider> = Arc::new(embedder);
            let completer: Arc<dyn CompletionProvider> = Arc::new(completer);
            Ok((embedder, completer))
        }
        ProviderKind::Ollama => {
            let client = Arc::new(OllamaClient::new(config)?);
            tracing::info!(
                "Using Ollama at {} (embed: {}, generate: {})",
                config.embed_base_url,
                config.embed_model,
                config.generate_model
            );
            let embedder: Arc<dyn EmbeddingProvider> = client.clone();
            let completer: Arc<dyn CompletionProvider> = client;
            Ok((embedder, completer))
        }
    }
}
