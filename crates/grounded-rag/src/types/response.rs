//! Response types for ingestion and queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::{Document, DocumentChunk};

/// Grounded answer produced by the query engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagAnswer {
    /// Text returned by the completion service
    pub answer: String,
    /// Retrieved chunks, most similar first
    pub sources: Vec<DocumentChunk>,
    /// Fixed placeholder, not derived from retrieval scores
    pub confidence: f32,
}

/// Summary of an uploaded document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    /// Document ID
    pub id: Uuid,
    /// Filename
    pub name: String,
    /// Number of chunks created
    pub chunks_count: usize,
    /// Upload timestamp
    pub uploaded_at: DateTime<Utc>,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            name: doc.name.clone(),
            chunks_count: doc.chunks.len(),
            uploaded_at: doc.uploaded_at,
        }
    }
}

/// Response from the upload endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// The ingested document
    pub document: DocumentSummary,
}

/// Response for listing documents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListResponse {
    /// Uploaded documents, oldest first
    pub documents: Vec<DocumentSummary>,
    /// Total count
    pub total_count: usize,
    /// Entries currently held by the vector index
    pub indexed_chunks: usize,
}

/// Health check payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "OK".to_string(),
            timestamp: Utc::now(),
        }
    }
}
