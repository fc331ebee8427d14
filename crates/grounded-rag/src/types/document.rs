//! Document and chunk types with provenance for source display

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A document that has been uploaded and extracted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Original filename as uploaded
    pub name: String,
    /// Media type the content was extracted from
    pub media_type: String,
    /// Full extracted text
    pub content: String,
    /// Chunks produced by ingestion, in document order
    pub chunks: Vec<DocumentChunk>,
    /// Upload timestamp
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document with no chunks attached yet
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            media_type: media_type.into(),
            content,
            chunks: Vec::new(),
            uploaded_at: Utc::now(),
        }
    }

    /// Attach the chunk list produced by ingestion
    pub fn attach_chunks(&mut self, chunks: Vec<DocumentChunk>) {
        self.chunks = chunks;
    }
}

/// Provenance of a chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    /// Originating document name
    pub source: String,
    /// Page number, when the extractor knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Ordinal within the source document
    pub chunk_index: usize,
    /// Character offset of the first char in the document content
    pub char_start: usize,
    /// Character offset one past the last char
    pub char_end: usize,
}

/// An indexable span of a document's text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// `<source>-chunk-<ordinal>`
    pub id: String,
    /// Text span
    pub content: String,
    /// Embedding vector, set once the chunk has been embedded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Provenance
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    /// Create an unembedded chunk
    pub fn new(source: &str, chunk_index: usize, content: String, char_start: usize, char_end: usize) -> Self {
        Self {
            id: Self::chunk_id(source, chunk_index),
            content,
            embedding: None,
            metadata: ChunkMetadata {
                source: source.to_string(),
                page: None,
                chunk_index,
                char_start,
                char_end,
            },
        }
    }

    /// Deterministic chunk id for a source and ordinal
    pub fn chunk_id(source: &str, chunk_index: usize) -> String {
        format!("{}-chunk-{}", source, chunk_index)
    }

    /// Consume the chunk and return it with an embedding attached
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}
