//! File upload endpoint

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::ingestion::TextExtractor;
use crate::server::state::AppState;
use crate::types::response::{DocumentSummary, UploadResponse};

/// Multipart field carrying the file
const FILE_FIELD: &str = "file";

/// POST /api/upload - Upload one file and index it
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let limit = state.config().server.max_upload_size;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit, "Failed to read multipart field"))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "upload".to_string());
        let declared = field.content_type().map(|s| s.to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, limit, "Failed to read file"))?;

        let summary = store_upload(&state, &filename, declared.as_deref(), data.to_vec()).await?;
        return Ok(Json(UploadResponse { document: summary }));
    }

    Err(Error::InvalidRequest("No file provided".to_string()))
}

/// Body-limit rejections become `FileTooLarge`; everything else is a bad request
fn multipart_error(err: MultipartError, limit: usize, context: &str) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!("Upload rejected: body exceeds {} bytes", limit);
        Error::file_too_large(limit)
    } else {
        Error::InvalidRequest(format!("{}: {}", context, err))
    }
}

/// Extract, ingest and register one uploaded file
pub async fn store_upload(
    state: &AppState,
    filename: &str,
    declared_type: Option<&str>,
    data: Vec<u8>,
) -> Result<DocumentSummary> {
    let start = Instant::now();
    let media_type = TextExtractor::resolve_media_type(declared_type, filename);

    tracing::info!(
        "Processing upload: {} ({} bytes, {})",
        filename,
        data.len(),
        media_type
    );

    let document = state
        .service()
        .ingest_file(data, &media_type, filename)
        .await?;
    let summary = DocumentSummary::from(&document);
    state.add_document(document);

    tracing::info!(
        "Upload {} completed in {}ms ({} chunks)",
        filename,
        start.elapsed().as_millis(),
        summary.chunks_count
    );

    Ok(summary)
}
