//! One shared index with its ingestion pipeline and query engine

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::generation::QueryEngine;
use crate::ingestion::{IngestPipeline, TextChunker};
use crate::providers::{build_providers, CompletionProvider, EmbeddingProvider};
use crate::retrieval::VectorIndex;
use crate::types::{Document, DocumentChunk, RagAnswer};

/// Ingestion and querying over a single vector index
pub struct RagService {
    index: Arc<VectorIndex>,
    pipeline: IngestPipeline,
    engine: QueryEngine,
}

impl RagService {
    /// Wire explicit providers to a fresh index
    pub fn new(
        config: &RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        completer: Arc<dyn CompletionProvider>,
    ) -> Result<Self> {
        Self::with_index(config, embedder, completer, Arc::new(VectorIndex::new()))
    }

    /// Wire explicit providers to an existing index
    pub fn with_index(
        config: &RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        completer: Arc<dyn CompletionProvider>,
        index: Arc<VectorIndex>,
    ) -> Result<Self> {
        let timeout = config.llm.request_timeout();
        let chunker = TextChunker::from_config(&config.chunking)?;

        let pipeline = IngestPipeline::new(chunker, embedder.clone(), index.clone())
            .with_timeout(timeout);
        let engine = QueryEngine::new(embedder, completer, index.clone())
            .with_retrieval(&config.retrieval)
            .with_timeout(timeout);

        Ok(Self {
            index,
            pipeline,
            engine,
        })
    }

    /// Build the providers named by the config
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        let (embedder, completer) = build_providers(&config.llm)?;
        Self::new(config, embedder, completer)
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    /// Chunk, embed and index raw text
    pub async fn ingest(&self, raw_text: &str, source_name: &str) -> Result<Vec<DocumentChunk>> {
        self.pipeline.ingest(raw_text, source_name).await
    }

    /// Extract and ingest an uploaded file
    pub async fn ingest_file(
        &self,
        data: Vec<u8>,
        media_type: &str,
        file_name: &str,
    ) -> Result<Document> {
        self.pipeline.ingest_file(data, media_type, file_name).await
    }

    /// Answer from the top `k` chunks
    pub async fn answer(&self, question: &str, k: usize) -> Result<RagAnswer> {
        self.engine.answer(question, k).await
    }

    /// Answer with the configured default `k`
    pub async fn ask(&self, question: &str) -> Result<RagAnswer> {
        self.engine.ask(question).await
    }
}
