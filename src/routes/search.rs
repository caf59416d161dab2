//! Search API routes
//!
//! Substring search over the text extracted from uploaded documents.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::DocumentRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Number of characters of extracted text included per result
pub const SNIPPET_CHARS: usize = 200;

/// Create the search router
pub fn router() -> Router<AppState> {
    Router::new().route("/search/", get(search_documents))
}

/// Query parameters for document search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Search query
    #[serde(default)]
    pub q: Option<String>,
}

/// Single search hit
#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub id: String,
    /// URL of the stored file
    pub file: String,
    /// Leading part of the extracted text
    pub text: String,
    pub uploaded_at: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

/// GET /search/?q=invoice
async fn search_documents(
    State(state): State<AppState>,
    query: std::result::Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResponse>> {
    let q = query
        .ok()
        .and_then(|Query(params)| params.q)
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or(AppError::MissingSearchQuery)?;

    let documents = DocumentRepository::new(state.db()).search_text(&q).await?;

    tracing::debug!(query = %q, hits = documents.len(), "Search complete");

    let results = documents
        .iter()
        .map(|doc| SearchResult {
            id: doc.id.clone(),
            file: state.blob_store().url(&doc.file),
            text: snippet(doc.text()),
            uploaded_at: doc.uploaded_at_display(),
        })
        .collect();

    Ok(Json(SearchResponse { results }))
}

/// First `SNIPPET_CHARS` characters
fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_CHARS).collect()
}
