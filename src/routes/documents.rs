//! Document listing routes
//!
//! Read-only views over stored document records:
//! - GET /documents/ - all documents, newest first
//! - GET /documents/:id - one document with its extracted text

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::db::{Document, DocumentRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the documents router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/documents/", get(list_documents))
        .route("/documents/:id", get(get_document))
}

/// Response for document list
#[derive(Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentSummary>,
    pub total: usize,
}

/// Summary of a document for list view
#[derive(Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub file: String,
    pub document_type: Option<String>,
    pub metadata: serde_json::Value,
    pub uploaded_at: String,
}

/// Full document details
#[derive(Serialize)]
pub struct DocumentDetailResponse {
    #[serde(flatten)]
    pub summary: DocumentSummary,
    pub extracted_text: String,
}

fn summarize(state: &AppState, doc: &Document) -> Result<DocumentSummary> {
    Ok(DocumentSummary {
        id: doc.id.clone(),
        file: state.blob_store().url(&doc.file),
        document_type: doc.document_type.clone(),
        metadata: doc.metadata_value()?,
        uploaded_at: doc.uploaded_at_display(),
    })
}

/// GET /documents/
async fn list_documents(State(state): State<AppState>) -> Result<Json<DocumentListResponse>> {
    let documents = DocumentRepository::new(state.db()).list().await?;

    let summaries = documents
        .iter()
        .map(|doc| summarize(&state, doc))
        .collect::<Result<Vec<_>>>()?;

    let total = summaries.len();

    Ok(Json(DocumentListResponse {
        documents: summaries,
        total,
    }))
}

/// GET /documents/:id
async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentDetailResponse>> {
    let doc = DocumentRepository::new(state.db())
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document not found: {}", id)))?;

    Ok(Json(DocumentDetailResponse {
        summary: summarize(&state, &doc)?,
        extracted_text: doc.text().to_string(),
    }))
}
