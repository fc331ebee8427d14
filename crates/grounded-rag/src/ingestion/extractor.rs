//! Text extraction from uploaded files by media type

use std::panic::{self, AssertUnwindSafe};

use crate::error::{Error, Result};

const PDF: &str = "application/pdf";
const PLAIN: &str = "text/plain";
const MARKDOWN: &str = "text/markdown";
const OCTET_STREAM: &str = "application/octet-stream";

/// Extracts plain text from PDF, plain-text and markdown uploads
pub struct TextExtractor;

impl TextExtractor {
    /// Media types with an extractor
    pub fn supported_types() -> &'static [&'static str] {
        &[PDF, PLAIN, MARKDOWN]
    }

    /// Check if a media type is supported
    pub fn is_supported(media_type: &str) -> bool {
        let essence = essence(media_type);
        Self::supported_types().contains(&essence.as_str()) || essence == "text/x-markdown"
    }

    /// Pick the declared media type, or guess one from the filename
    ///
    /// A missing or generic `application/octet-stream` declaration falls
    /// back to the file extension.
    pub fn resolve_media_type(declared: Option<&str>, filename: &str) -> String {
        match declared.map(essence) {
            Some(m) if !m.is_empty() && m != OCTET_STREAM => m,
            _ => mime_guess::from_path(filename)
                .first_raw()
                .unwrap_or(OCTET_STREAM)
                .to_string(),
        }
    }

    /// Extract text from raw bytes
    pub fn extract(data: &[u8], media_type: &str) -> Result<String> {
        Self::extract_file("document", data, media_type)
    }

    /// Extract text, naming the file in any error
    pub fn extract_file(filename: &str, data: &[u8], media_type: &str) -> Result<String> {
        match essence(media_type).as_str() {
            PDF => Self::extract_pdf(filename, data),
            PLAIN | MARKDOWN | "text/x-markdown" => Self::extract_utf8(filename, data),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }

    fn extract_utf8(filename: &str, data: &[u8]) -> Result<String> {
        let text = std::str::from_utf8(data)
            .map_err(|e| Error::extraction(filename, format!("Invalid UTF-8: {}", e)))?;
        Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
    }

    fn extract_pdf(filename: &str, data: &[u8]) -> Result<String> {
        // pdf-extract can panic on malformed fonts
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(data)
        }))
        .map_err(|_| Error::extraction(filename, "PDF parser panicked"))?;

        let content = result.map_err(|e| Error::extraction(filename, e.to_string()))?;
        let content = content.replace('\0', "");
        let content = content.trim();

        if content.is_empty() {
            return Err(Error::extraction(
                filename,
                "No text could be extracted from PDF",
            ));
        }

        tracing::debug!("Extracted {} chars from PDF {}", content.len(), filename);
        Ok(content.to_string())
    }
}

/// Lowercased media type without parameters (`text/plain; charset=utf-8` -> `text/plain`)
fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
