//! Retrieval-augmented query engine

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::RetrievalConfig;
use crate::error::{Error, Result};
use crate::providers::{CompletionProvider, EmbeddingProvider};
use crate::retrieval::VectorIndex;
use crate::types::{DocumentChunk, RagAnswer};

use super::prompt::PromptBuilder;

/// Answers questions from the chunks held by a shared index
pub struct QueryEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    completer: Arc<dyn CompletionProvider>,
    index: Arc<VectorIndex>,
    /// Chunks retrieved when the caller does not say
    default_k: usize,
    /// Placeholder reported with every answer
    confidence: f32,
    /// Deadline for each external call
    timeout: Option<Duration>,
}

impl QueryEngine {
    /// Create a query engine reading from `index`
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        completer: Arc<dyn CompletionProvider>,
        index: Arc<VectorIndex>,
    ) -> Self {
        let retrieval = RetrievalConfig::default();
        Self {
            embedder,
            completer,
            index,
            default_k: retrieval.top_k,
            confidence: retrieval.confidence,
            timeout: None,
        }
    }

    /// Apply retrieval settings
    pub fn with_retrieval(mut self, config: &RetrievalConfig) -> Self {
        self.default_k = config.top_k;
        self.confidence = config.confidence;
        self
    }

    /// Apply a deadline to every external call
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn default_k(&self) -> usize {
        self.default_k
    }

    /// Answer with the default number of retrieved chunks
    pub async fn ask(&self, question: &str) -> Result<RagAnswer> {
        self.answer(question, self.default_k).await
    }

    /// Answer a question from the top `k` most similar chunks
    pub async fn answer(&self, question: &str, k: usize) -> Result<RagAnswer> {
        self.answer_with_timeout(question, k, self.timeout).await
    }

    /// Like [`answer`](Self::answer) with an explicit per-call deadline
    pub async fn answer_with_timeout(
        &self,
        question: &str,
        k: usize,
        timeout: Option<Duration>,
    ) -> Result<RagAnswer> {
        let started = Instant::now();

        if question.trim().is_empty() {
            return Err(Error::EmptyQuestion);
        }

        let request = self.embedder.embed(question);
        let query = match timeout {
            Some(limit) => tokio::time::timeout(limit, request).await.map_err(|_| {
                Error::retrieval(format!("Question embedding timed out after {:?}", limit))
            })?,
            None => request.await,
        }
        .map_err(Error::into_retrieval)?;

        let hits = self.index.search(&query, k)?;
        tracing::debug!(
            "Retrieved {} chunks (best score {:?})",
            hits.len(),
            hits.first().map(|h| h.score)
        );

        let context = PromptBuilder::build_context(&hits);
        let prompt = PromptBuilder::build_rag_prompt(question, &context);

        let request = self.completer.complete(&prompt);
        let answer = match timeout {
            Some(limit) => tokio::time::timeout(limit, request).await.map_err(|_| {
                Error::generation(format!("Completion timed out after {:?}", limit))
            })?,
            None => request.await,
        }
        .map_err(Error::into_generation)?;

        let sources: Vec<DocumentChunk> = hits
            .iter()
            .map(|h| DocumentChunk::clone(&h.chunk))
            .collect();

        tracing::info!(
            "Answered question with {} sources using {} in {}ms",
            sources.len(),
            self.completer.model(),
            started.elapsed().as_millis()
        );

        Ok(RagAnswer {
            answer,
            sources,
            confidence: self.confidence,
        })
    }
}
