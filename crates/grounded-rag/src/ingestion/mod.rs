//! Document ingestion: text extraction, chunking and indexing

mod chunker;
mod extractor;
mod processor;

pub use chunker::{split_text, ChunkSpan, TextChunker};
pub use extractor::TextExtractor;
pub use processor::IngestPipeline;
