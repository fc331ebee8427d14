//! Query endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{QueryRequest, RagAnswer};

/// POST /api/query - Answer a question from the uploaded documents
pub async fn query_rag(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<RagAnswer>> {
    let Json(request) = payload.map_err(|rejection| {
        Error::InvalidRequest(format!(
            "Question is required and must be a string: {}",
            rejection.body_text()
        ))
    })?;
    let engine = state.service().engine();
    let k = request.k.unwrap_or_else(|| engine.default_k());

    tracing::info!("Query (k={}): \"{}\"", k, request.question);

    let answer = engine.answer(&request.question, k).await?;
    Ok(Json(answer))
}
