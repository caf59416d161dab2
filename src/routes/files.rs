//! File serving routes
//!
//! Serves stored uploads back from the blob store.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Router,
};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the files router
pub fn router() -> Router<AppState> {
    Router::new().route("/*path", get(serve_file))
}

/// Serve a stored file
async fn serve_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response> {
    let object = state.blob_store().open(&path).await?;

    let content_type = object.content_type_or_guess();
    let filename = object.file_name().to_string();
    let size = object.size;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename*=UTF-8''{}", urlencoding::encode(&filename)),
        )
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .body(Body::from(object.data))
        .map_err(|e| AppError::Internal(e.to_string()))
}
