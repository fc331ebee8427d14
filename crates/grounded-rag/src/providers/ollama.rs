//! Ollama client for embeddings and answer generation

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::CompletionProvider;

/// Ollama API client serving both embeddings and completions
pub struct OllamaClient {
    /// HTTP client
    client: Client,
    /// Embedding server base URL
    embed_url: String,
    /// Generation server base URL
    generate_url: String,
    /// Embedding model
    embed_model: String,
    /// Generation model
    generate_model: String,
    /// Temperature for generation
    temperature: f32,
    /// Maximum inputs per embedding request
    batch_size: usize,
    /// Dimensions of the last embedding received (0 until known)
    observed_dims: AtomicUsize,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder().pool_max_idle_per_host(5).build()?;

        Ok(Self {
            client,
            embed_url: config.embed_base_url.trim_end_matches('/').to_string(),
            generate_url: config.generate_base_url.trim_end_matches('/').to_string(),
            embed_model: config.embed_model.clone(),
            generate_model: config.generate_model.clone(),
            temperature: config.temperature,
            batch_size: config.embed_batch_size.max(1),
            observed_dims: AtomicUsize::new(0),
        })
    }

    /// Check if Ollama is available
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.embed_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn embed_request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.embed_url);

        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest {
                model: &self.embed_model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| Error::retrieval(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::retrieval(format!(
                "Embedding failed: HTTP {} - {}",
                status, body
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::retrieval(format!("Failed to parse embedding response: {}", e)))?;

        if parsed.embeddings.len() != texts.len() {
            return Err(Error::retrieval(format!(
                "Ollama returned {} embeddings for {} inputs",
                parsed.embeddings.len(),
                texts.len()
            )));
        }
        if let Some(first) = parsed.embeddings.first() {
            self.observed_dims.store(first.len(), Ordering::Relaxed);
        }

        Ok(parsed.embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_request(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::retrieval("Ollama returned no embedding"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.embed_request(batch).await?);
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> Option<usize> {
        match self.observed_dims.load(Ordering::Relaxed) {
            0 => None,
            dims => Some(dims),
        }
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[async_trait]
impl CompletionProvider for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.generate_url);

        tracing::debug!("Generating answer with model: {}", self.generate_model);

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest {
                model: &self.generate_model,
                prompt,
                stream: false,
                options: GenerateOptions {
                    temperature: self.temperature,
                },
            })
            .send()
            .await
            .map_err(|e| Error::generation(format!("Generation request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::generation(format!(
                "Generation failed: HTTP {} - {}",
                status, body
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(format!("Failed to parse generation response: {}", e)))?;

        Ok(parsed.response)
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.generate_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_disables_streaming() {
        let request = GenerateRequest {
            model: "llama3.2:3b",
            prompt: "hello",
            stream: false,
            options: GenerateOptions { temperature: 0.0 },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["temperature"], 0.0);
    }

    #[test]
    fn test_embed_response_parse() {
        let raw = r#"{"model":"nomic-embed-text","embeddings":[[0.1,0.2],[0.3,0.4]]}"#;
        let parsed: EmbedResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.embeddings.len(), 2);
        assert_eq!(parsed.embeddings[1], vec![0.3, 0.4]);
    }

    #[test]
    fn test_new_trims_urls() {
        let mut config = LlmConfig::ollama();
        config.embed_base_url = "http://localhost:11434/".to_string();
        let client = OllamaClient::new(&config).unwrap();
        assert_eq!(client.embed_url, "http://localhost:11434");
        assert_eq!(CompletionProvider::model(&client), "llama3.2:3b");
    }
}
