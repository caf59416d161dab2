//! OCR Types

use serde::{Deserialize, Serialize};

/// OCR provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OcrProvider {
    /// Tesseract OCR (local binary)
    #[default]
    Tesseract,
    /// Ollama vision model (local LLM)
    Ollama,
}

/// OCR result
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Recognized text
    pub text: String,
    /// Confidence score (0-100)
    pub confidence: f64,
    /// Provider used
    pub provider: OcrProvider,
}

/// OCR error types
///
/// Every variant ends up in the upload response as `OCR processing failed: <message>`.
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("Failed to read image: {0}")]
    ReadError(String),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("{0}")]
    ProcessingError(String),

    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),

    #[error("API error: {0}")]
    ApiError(String),
}
