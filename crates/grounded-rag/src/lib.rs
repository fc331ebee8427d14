//! grounded-rag: question answering grounded in uploaded documents
//!
//! Documents are split into overlapping chunks, embedded through an external
//! embedding service and kept in an in-memory vector index. Questions are
//! answered by retrieving the most similar chunks and asking a completion
//! service to answer only from them, quoting the source text.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod service;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use generation::QueryEngine;
pub use ingestion::{IngestPipeline, TextChunker, TextExtractor};
pub use providers::{CompletionProvider, EmbeddingProvider};
pub use retrieval::{SearchHit, VectorIndex};
pub use service::RagService;
pub use types::{
    document::{ChunkMetadata, Document, DocumentChunk},
    query::QueryRequest,
    response::RagAnswer,
};
