//! Deterministic in-process providers shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use grounded_rag::config::RagConfig;
use grounded_rag::generation::PromptBuilder;
use grounded_rag::{CompletionProvider, EmbeddingProvider, Error, RagService, Result};

pub const PARIS: &str = "Paris is the capital of France. It is known for the Eiffel Tower.";

pub const INSUFFICIENT: &str = "I don't have enough information to answer the question.";

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

/// Counts occurrences of a fixed vocabulary
pub struct KeywordEmbedder {
    vocabulary: Vec<&'static str>,
    pub calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn geography() -> Self {
        Self::new(vec![
            "paris", "is", "the", "capital", "of", "france", "it", "known", "for", "eiffel",
            "tower", "what",
        ])
    }

    pub fn new(vocabulary: Vec<&'static str>) -> Self {
        Self {
            vocabulary,
            calls: AtomicUsize::new(0),
        }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.vocabulary.len()];
        for token in tokens(text) {
            if let Some(i) = self.vocabulary.iter().position(|w| *w == token) {
                vector[i] += 1.0;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.vocabulary.len())
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Bag of words hashed into a fixed number of buckets
pub struct HashingEmbedder {
    pub dims: usize,
}

impl HashingEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0; self.dims];
        for token in tokens(text) {
            // FNV-1a
            let hash = token
                .bytes()
                .fold(0xcbf29ce484222325u64, |h, b| (h ^ b as u64).wrapping_mul(0x100000001b3));
            vector[(hash % self.dims as u64) as usize] += 1.0;
        }
        Ok(vector)
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.dims)
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

/// Answers by quoting the context it was given
#[derive(Default)]
pub struct QuotingCompleter {
    pub calls: AtomicUsize,
}

#[async_trait]
impl CompletionProvider for QuotingCompleter {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match PromptBuilder::extract_context(prompt) {
            Some(context) if !context.starts_with("No relevant context") => {
                let quote = context.split("\n\n").next().unwrap_or(context).trim();
                Ok(format!("According to the document: \"{}\"", quote))
            }
            _ => Ok(INSUFFICIENT.to_string()),
        }
    }

    fn name(&self) -> &str {
        "quoting"
    }

    fn model(&self) -> &str {
        "quoting-1"
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::retrieval("embedding service unavailable"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

pub struct FailingCompleter;

#[async_trait]
impl CompletionProvider for FailingCompleter {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(Error::internal("completion service unavailable"))
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn model(&self) -> &str {
        "failing-1"
    }
}

/// Never returns
pub struct PendingEmbedder;

#[async_trait]
impl EmbeddingProvider for PendingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        std::future::pending().await
    }

    fn name(&self) -> &str {
        "pending"
    }
}

/// Sleeps before answering
pub struct SlowCompleter(pub Duration);

#[async_trait]
impl CompletionProvider for SlowCompleter {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        tokio::time::sleep(self.0).await;
        Ok("late".to_string())
    }

    fn name(&self) -> &str {
        "slow"
    }

    fn model(&self) -> &str {
        "slow-1"
    }
}

/// Config with the given chunking and no external services
pub fn config(chunk_size: usize, overlap: usize) -> RagConfig {
    let mut config = RagConfig::default();
    config.chunking.chunk_size = chunk_size;
    config.chunking.chunk_overlap = overlap;
    config
}

/// Service over the geography vocabulary with a quoting completer
pub fn geography_service(chunk_size: usize, overlap: usize) -> RagService {
    RagService::new(
        &config(chunk_size, overlap),
        Arc::new(KeywordEmbedder::geography()),
        Arc::new(QuotingCompleter::default()),
    )
    .expect("valid test config")
}
