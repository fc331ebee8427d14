//! OpenAI-compatible client for embeddings and chat completions
//!
//! Works against OpenAI itself and API-compatible services such as DeepSeek.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::CompletionProvider;

/// OpenAI-compatible API client bound to one base URL and model
pub struct OpenAiClient {
    /// HTTP client
    client: Client,
    /// Base URL including the version prefix, e.g. `https://api.openai.com/v1`
    base_url: String,
    /// Bearer token
    api_key: Option<String>,
    /// Model name
    model: String,
    /// Temperature for chat completions
    temperature: f32,
    /// Maximum inputs per embedding request
    batch_size: usize,
    /// Dimensions of the last embedding received (0 until known)
    observed_dims: AtomicUsize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a client from explicit parts
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        temperature: f32,
        batch_size: usize,
    ) -> Result<Self> {
        let client = Client::builder().pool_max_idle_per_host(5).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            temperature,
            batch_size: batch_size.max(1),
            observed_dims: AtomicUsize::new(0),
        })
    }

    /// Client for the configured embedding service
    pub fn embeddings(config: &LlmConfig) -> Result<Self> {
        Self::new(
            config.embed_base_url.clone(),
            config.embed_api_key.clone(),
            config.embed_model.clone(),
            config.temperature,
            config.embed_batch_size,
        )
    }

    /// Client for the configured completion service
    pub fn completions(config: &LlmConfig) -> Result<Self> {
        Self::new(
            config.generate_base_url.clone(),
            config.generate_api_key.clone(),
            config.generate_model.clone(),
            config.temperature,
            config.embed_batch_size,
        )
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.post(format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Embed one request's worth of inputs
    async fn embed_request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let response = self
            .post("/embeddings")
            .json(&EmbeddingRequest {
                model: &self.model,
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

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::retrieval(format!("Failed to parse embedding response: {}", e)))?;

        let vectors = order_embeddings(parsed.data, texts.len())?;
        if let Some(first) = vectors.first() {
            self.observed_dims.store(first.len(), Ordering::Relaxed);
        }
        Ok(vectors)
    }
}

/// Sort response items by `index` and check they cover `0..expected` once each
fn order_embeddings(mut data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Vec<f32>>> {
    if data.len() != expected {
        return Err(Error::retrieval(format!(
            "Embedding service returned {} vectors for {} inputs",
            data.len(),
            expected
        )));
    }
    data.sort_by_key(|d| d.index);
    if let Some((position, item)) = data.iter().enumerate().find(|(i, d)| d.index != *i) {
        return Err(Error::retrieval(format!(
            "Embedding service returned index {} at position {}",
            item.index, position
        )));
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_request(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::retrieval("Embedding service returned no vector"))
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
        "openai"
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        tracing::debug!("Requesting completion from {}", self.model);

        let response = self
            .post("/chat/completions")
            .json(&ChatRequest {
                model: &self.model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: prompt,
                }],
                temperature: self.temperature,
            })
            .send()
            .await
            .map_err(|e| Error::generation(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::generation(format!(
                "Completion failed: HTTP {} - {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(format!("Failed to parse completion response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::generation("Completion response contained no message"))
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
