//! Upload Routes
//!
//! Endpoints:
//! - POST /upload/ - multipart form with a single `file` part

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::ingest::{ingest, DocumentMetadata, Upload};
use crate::state::AppState;

/// Name of the multipart field carrying the file
const FILE_FIELD: &str = "file";

/// Upload response
#[derive(Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub document_id: String,
    pub extracted_text: String,
    pub metadata: DocumentMetadata,
}

/// Create the upload router
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/upload/", post(upload_document).fallback(invalid_method))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// POST /upload/
///
/// Store the file, OCR it when it is an image, classify and record it.
async fn upload_document(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Rejected upload body: {}", e);
        AppError::InvalidRequest
    })?;

    let upload = read_file_part(&mut multipart)
        .await?
        .ok_or(AppError::InvalidRequest)?;

    tracing::debug!(
        file_name = %upload.file_name,
        size = upload.data.len(),
        "Received upload"
    );

    let ingested = ingest(&state, upload).await?;

    Ok(Json(UploadResponse {
        message: "File uploaded and processed successfully",
        document_id: ingested.document.id,
        extracted_text: ingested.extracted_text,
        metadata: ingested.metadata,
    }))
}

/// Any other method on /upload/
async fn invalid_method() -> AppError {
    AppError::InvalidRequest
}

/// Find the `file` part. Returns `None` when it is missing, nameless or empty.
async fn read_file_part(multipart: &mut Multipart) -> Result<Option<Upload>> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::debug!("Failed to read multipart field: {}", e);
        AppError::InvalidRequest
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = match field.file_name() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => return Ok(None),
        };
        let content_type = field.content_type().map(|s| s.to_string());

        let data = field.bytes().await.map_err(|e| {
            tracing::debug!("Failed to read file data: {}", e);
            AppError::InvalidRequest
        })?;

        if data.is_empty() {
            return Ok(None);
        }

        return Ok(Some(Upload {
            file_name,
            content_type,
            data,
        }));
    }

    Ok(None)
}
