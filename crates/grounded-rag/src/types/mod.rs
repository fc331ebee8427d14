//! Core types for the RAG engine

pub mod document;
pub mod query;
pub mod response;

pub use document::{ChunkMetadata, Document, DocumentChunk};
pub use query::QueryRequest;
pub use response::{DocumentSummary, RagAnswer};
