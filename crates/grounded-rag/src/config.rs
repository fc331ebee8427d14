//! Configuration for the RAG engine and server

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Embedding and completion service configuration
    #[serde(default)]
    pub llm: LlmConfig,
}

impl RagConfig {
    /// Parse a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    /// Load defaults (or a file, when given) and apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(host) = get("RAG_HOST") {
            self.server.host = host;
        }
        if let Some(provider) = get("RAG_PROVIDER") {
            match provider.to_lowercase().as_str() {
                "ollama" => self.llm.provider = ProviderKind::Ollama,
                "openai" => self.llm.provider = ProviderKind::OpenAi,
                other => tracing::warn!("Ignoring unknown RAG_PROVIDER '{}'", other),
            }
        }

        match self.llm.provider {
            ProviderKind::OpenAi => {
                if let Some(key) = get("OPENAI_API_KEY") {
                    self.llm.embed_api_key = Some(key);
                }
                if let Some(url) = get("OPENAI_BASE_URL") {
                    self.llm.embed_base_url = url;
                }
                if let Some(key) = get("DEEPSEEK_API_KEY") {
                    self.llm.generate_api_key = Some(key);
                }
                if let Some(url) = get("DEEPSEEK_BASE_URL") {
                    self.llm.generate_base_url = url;
                }
            }
            ProviderKind::Ollama => {
                if let Some(url) = get("OLLAMA_BASE_URL") {
                    self.llm.embed_base_url = url.clone();
                    self.llm.generate_base_url = url;
                }
            }
        }
    }

    /// Check invariants that would otherwise fail at the first request
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::InvalidChunkConfig {
                chunk_size: self.chunking.chunk_size,
                overlap: self.chunking.chunk_overlap,
            });
        }

        if self.llm.provider == ProviderKind::OpenAi {
            if self.llm.embed_api_key.is_none() {
                return Err(Error::Config(
                    "OPENAI_API_KEY is required for the openai provider".to_string(),
                ));
            }
            if self.llm.generate_api_key.is_none() {
                return Err(Error::Config(
                    "DEEPSEEK_API_KEY is required for the openai provider".to_string(),
                ));
            }
        }

        if self.llm.embed_batch_size == 0 {
            return Err(Error::Config("embed_batch_size must be at least 1".to_string()));
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 10MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            enable_cors: true,
            max_upload_size: 10 * 1024 * 1024,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Characters repeated at the start of the next chunk
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Chunks retrieved per question when the caller does not say
    pub top_k: usize,
    /// Placeholder confidence reported with every answer
    pub confidence: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            confidence: 0.8,
        }
    }
}

/// Which wire protocol the external services speak
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible `/embeddings` and `/chat/completions` (OpenAI, DeepSeek)
    #[default]
    OpenAi,
    /// Ollama `/api/embed` and `/api/generate`
    Ollama,
}

/// Embedding and completion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider protocol
    #[serde(default)]
    pub provider: ProviderKind,
    /// Embedding service base URL
    pub embed_base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Embedding service API key
    #[serde(default, skip_serializing)]
    pub embed_api_key: Option<String>,
    /// Completion service base URL
    pub generate_base_url: String,
    /// Completion model name
    pub generate_model: String,
    /// Completion service API key
    #[serde(default, skip_serializing)]
    pub generate_api_key: Option<String>,
    /// Temperature for generation
    pub temperature: f32,
    /// Per-call deadline for external requests; none by default
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Maximum texts per embedding request
    pub embed_batch_size: usize,
}

impl LlmConfig {
    /// Deadline applied to each external call, if any
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Defaults for a local Ollama server
    pub fn ollama() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            embed_base_url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            embed_api_key: None,
            generate_base_url: "http://localhost:11434".to_string(),
            generate_model: "llama3.2:3b".to_string(),
            generate_api_key: None,
            temperature: 0.0,
            request_timeout_secs: None,
            embed_batch_size: 96,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            embed_base_url: "https://api.openai.com/v1".to_string(),
            embed_model: "text-embedding-ada-002".to_string(),
            embed_api_key: None,
            generate_base_url: "https://api.deepseek.com/v1".to_string(),
            generate_model: "deepseek-chat".to_string(),
            generate_api_key: None,
            temperature: 0.0,
            request_timeout_secs: None,
            embed_batch_size: 96,
        }
    }
}
