//! Ingestion pipeline orchestration: chunk, embed, index

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::retrieval::VectorIndex;
use crate::types::{Document, DocumentChunk};

use super::chunker::TextChunker;
use super::extractor::TextExtractor;

/// Upper bound on text extraction; pdf-extract can hang on some fonts
const EXTRACT_TIMEOUT: Duration = Duration::from_secs(60);

/// Main ingestion pipeline
///
/// The index insert is the last step, so a failed or dropped ingestion
/// leaves the index untouched.
pub struct IngestPipeline {
    /// Text chunker
    chunker: TextChunker,
    /// Embedding service
    embedder: Arc<dyn EmbeddingProvider>,
    /// Shared vector index
    index: Arc<VectorIndex>,
    /// Deadline for the embedding call
    timeout: Option<Duration>,
}

impl IngestPipeline {
    /// Create a new ingestion pipeline writing into `index`
    pub fn new(
        chunker: TextChunker,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<VectorIndex>,
    ) -> Self {
        Self {
            chunker,
            embedder,
            index,
            timeout: None,
        }
    }

    /// Apply a deadline to every embedding call
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Split text into unembedded chunks labelled with `source_name`
    pub fn chunk(&self, raw_text: &str, source_name: &str) -> Vec<DocumentChunk> {
        self.chunker
            .split_spans(raw_text)
            .into_iter()
            .enumerate()
            .map(|(i, span)| {
                DocumentChunk::new(
                    source_name,
                    i,
                    span.text.to_string(),
                    span.char_start,
                    span.char_end,
                )
            })
            .collect()
    }

    /// Chunk, embed and index a document's text
    ///
    /// Returns the embedded chunks in document order.
    pub async fn ingest(&self, raw_text: &str, source_name: &str) -> Result<Vec<DocumentChunk>> {
        self.ingest_with_timeout(raw_text, source_name, self.timeout)
            .await
    }

    /// Like [`ingest`](Self::ingest) with an explicit embedding deadline
    pub async fn ingest_with_timeout(
        &self,
        raw_text: &str,
        source_name: &str,
        timeout: Option<Duration>,
    ) -> Result<Vec<DocumentChunk>> {
        let started = Instant::now();

        if raw_text.trim().is_empty() {
            return Err(Error::EmptyDocument(source_name.to_string()));
        }

        // Skip the embedding call when the provider already reports a size
        // the index cannot take
        if let (Some(expected), Some(actual)) =
            (self.index.dimensions(), self.embedder.dimensions())
        {
            if expected != actual {
                return Err(Error::DimensionMismatch { expected, actual });
            }
        }

        let chunks = self.chunk(raw_text, source_name);
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();

        tracing::debug!(
            "Embedding {} chunks from {} with {}",
            texts.len(),
            source_name,
            self.embedder.name()
        );

        let request = self.embedder.embed_batch(&texts);
        let embeddings = match timeout {
            Some(limit) => tokio::time::timeout(limit, request).await.map_err(|_| {
                Error::retrieval(format!("Embedding timed out after {:?}", limit))
            })?,
            None => request.await,
        }
        .map_err(Error::into_retrieval)?;

        if embeddings.len() != chunks.len() {
            return Err(Error::retrieval(format!(
                "Embedding service returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        if self.index.contains_source(source_name) {
            tracing::warn!(
                "Source {} is already indexed; its chunks will be duplicated",
                source_name
            );
        }

        let stored = self
            .index
            .insert_batch(chunks.into_iter().zip(embeddings).collect())?;

        tracing::info!(
            "Ingested {}: {} chunks in {}ms",
            source_name,
            stored.len(),
            started.elapsed().as_millis()
        );

        Ok(stored.iter().map(|c| DocumentChunk::clone(c)).collect())
    }

    /// Extract text from an uploaded file and ingest it
    pub async fn ingest_file(
        &self,
        data: Vec<u8>,
        media_type: &str,
        file_name: &str,
    ) -> Result<Document> {
        let (name, media) = (file_name.to_string(), media_type.to_string());
        let content = run_extraction(file_name, EXTRACT_TIMEOUT, move || {
            TextExtractor::extract_file(&name, &data, &media)
        })
        .await?;

        let mut document = Document::new(file_name, media_type, content);
        let chunks = self.ingest(&document.content, file_name).await?;
        document.attach_chunks(chunks);

        Ok(document)
    }
}

/// Run a blocking extraction off the async runtime with a deadline
///
/// A timed-out extraction keeps its blocking thread until the parser returns;
/// the caller gets `ExtractionFailed` right away.
async fn run_extraction<F>(file_name: &str, limit: Duration, extract: F) -> Result<String>
where
    F: FnOnce() -> Result<String> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(extract);
    match tokio::time::timeout(limit, task).await {
        Ok(joined) => {
            joined.map_err(|e| Error::internal(format!("Extraction task failed: {}", e)))?
        }
        Err(_) => {
            tracing::error!("Extraction of {} timed out after {:?}", file_name, limit);
            Err(Error::extraction(
                file_name,
                format!("Extraction timed out after {:?}", limit),
            ))
        }
    }
}
