//! API routes for the RAG server

pub mod documents;
pub mod query;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Upload with a body limit sized for files
        .route(
            "/upload",
            post(upload::upload_file).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/query", post(query::query_rag))
        .route("/documents", get(documents::list_documents))
        .route("/documents/:id", get(documents::get_document))
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "grounded-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Question answering grounded in uploaded documents",
        "endpoints": {
            "POST /api/upload": "Upload a PDF, text or markdown file",
            "POST /api/query": "Ask a question",
            "GET /api/documents": "List uploaded documents",
            "GET /api/documents/:id": "Get document details"
        }
    }))
}
