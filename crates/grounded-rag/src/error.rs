//! Error types for the RAG engine

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG engine errors
///
/// The first eight variants are the operation-level taxonomy surfaced to
/// callers of `ingest` / `answer`. Each one is terminal for the operation in
/// which it occurs.
#[derive(Debug, Error)]
pub enum Error {
    /// Chunker parameters cannot produce progress
    #[error("Invalid chunk configuration: overlap ({overlap}) must be smaller than chunk size ({chunk_size})")]
    InvalidChunkConfig { chunk_size: usize, overlap: usize },

    /// Ingestion was handed no text
    #[error("Document '{0}' has no text content")]
    EmptyDocument(String),

    /// Query was empty or whitespace only
    #[error("Question cannot be empty")]
    EmptyQuestion,

    /// Embedding length differs from the index dimensionality
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Media type the extractor does not handle
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Extractor recognised the format but could not read it
    #[error("Failed to extract text from '{filename}': {message}")]
    ExtractionFailed { filename: String, message: String },

    /// Embedding service call failed or timed out
    #[error("Retrieval failed: {0}")]
    RetrievalFailed(String),

    /// Completion service call failed or timed out
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Malformed request at the HTTP layer
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upload exceeds the configured size limit
    #[error("{0}")]
    FileTooLarge(String),

    /// Document not in the registry
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an extraction error
    pub fn extraction(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an upload size error naming the limit
    pub fn file_too_large(limit: usize) -> Self {
        Self::FileTooLarge(format!(
            "File too large. Maximum size is {}",
            human_size(limit)
        ))
    }

    /// Create a retrieval (embedding) error
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::RetrievalFailed(message.into())
    }

    /// Create a generation (completion) error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::GenerationFailed(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Fold any failure from the embedding stage into `RetrievalFailed`
    pub fn into_retrieval(self) -> Self {
        match self {
            Error::RetrievalFailed(_) => self,
            other => Error::RetrievalFailed(other.to_string()),
        }
    }

    /// Fold any failure from the completion stage into `GenerationFailed`
    pub fn into_generation(self) -> Self {
        match self {
            Error::GenerationFailed(_) => self,
            other => Error::GenerationFailed(other.to_string()),
        }
    }

    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidChunkConfig { .. } => "INVALID_CHUNK_CONFIG",
            Error::EmptyDocument(_) => "EMPTY_DOCUMENT",
            Error::EmptyQuestion => "EMPTY_QUESTION",
            Error::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            Error::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Error::ExtractionFailed { .. } => "EXTRACTION_FAILED",
            Error::RetrievalFailed(_) => "RETRIEVAL_FAILED",
            Error::GenerationFailed(_) => "GENERATION_FAILED",
            Error::InvalidRequest(_) => "INVALID_REQUEST",
            Error::FileTooLarge(_) => "FILE_TOO_LARGE",
            Error::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Http(_) => "HTTP_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status the server layer maps this error to
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidChunkConfig { .. }
            | Error::EmptyDocument(_)
            | Error::EmptyQuestion
            | Error::DimensionMismatch { .. }
            | Error::UnsupportedFormat(_)
            | Error::ExtractionFailed { .. }
            | Error::InvalidRequest(_)
            | Error::FileTooLarge(_)
            | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::DocumentNotFound(_) => StatusCode::NOT_FOUND,
            Error::RetrievalFailed(_) | Error::GenerationFailed(_) | Error::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
            Error::Config(_) | Error::Io(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

fn human_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;
    match bytes {
        b if b >= MB && b % MB == 0 => format!("{}MB", b / MB),
        b if b >= MB => format!("{:.1}MB", b as f64 / MB as f64),
        b if b >= KB && b % KB == 0 => format!("{}KB", b / KB),
        b if b >= KB => format!("{:.1}KB", b as f64 / KB as f64),
        b => format!("{} bytes", b),
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "{}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}
