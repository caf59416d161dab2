//! Error types for the document recognition server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ocr::OcrError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Upload without a usable `file` part, or a non-POST upload
    #[error("Invalid request")]
    InvalidRequest,

    #[error("Search query is required")]
    MissingSearchQuery,

    #[error("{0}")]
    NotFound(String),

    #[error("OCR processing failed: {0}")]
    Ocr(#[from] OcrError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Blob storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("S3 connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("S3 SDK error: {0}")]
    SdkError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest | AppError::MissingSearchQuery => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(StorageError::ObjectNotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (message, internal) = match &self {
            AppError::InvalidRequest | AppError::MissingSearchQuery | AppError::NotFound(_) => {
                (self.to_string(), false)
            }
            AppError::Ocr(e) => {
                tracing::error!("OCR error: {}", e);
                (self.to_string(), false)
            }
            AppError::Storage(StorageError::ObjectNotFound(key)) => {
                (format!("Object not found: {}", key), false)
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {}", e);
                ("Storage error".to_string(), true)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                ("Database error".to_string(), true)
            }
            AppError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                ("Serialization error".to_string(), true)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("An internal error occurred".to_string(), true)
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            details: if internal && cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}
