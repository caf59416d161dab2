//! OCR Service
//!
//! Normalizes uploaded images and hands them to the configured provider.

use std::io::Cursor;
use std::sync::Arc;

use super::{
    provider::{OcrProviderTrait, OllamaProvider, TesseractProvider},
    types::{OcrError, OcrProvider, OcrResult},
};
use crate::config::OcrConfig;

/// OCR service used by the ingestion path
#[derive(Clone)]
pub struct OcrService {
    provider: Arc<dyn OcrProviderTrait>,
    language: String,
}

impl OcrService {
    /// Create a service around an explicit provider
    pub fn new(provider: Arc<dyn OcrProviderTrait>, language: &str) -> Self {
        Self {
            provider,
            language: language.to_string(),
        }
    }

    /// Create the service selected by configuration
    pub fn from_config(config: &OcrConfig) -> Self {
        let provider: Arc<dyn OcrProviderTrait> = match config.provider {
            OcrProvider::Tesseract => Arc::new(TesseractProvider::new(&config.tesseract_cmd)),
            OcrProvider::Ollama => Arc::new(OllamaProvider::new(
                &config.ollama_url,
                &config.ollama_model,
            )),
        };

        Self::new(provider, &config.language)
    }

    pub fn provider_type(&self) -> OcrProvider {
        self.provider.provider_type()
    }

    pub async fn is_available(&self) -> bool {
        self.provider.is_available().await
    }

    /// Extract text from an uploaded image (PNG or JPEG)
    pub async fn extract_text(&self, image_data: &[u8]) -> Result<OcrResult, OcrError> {
        validate_language(&self.language)?;

        let data = image_data.to_vec();
        let png = tokio::task::spawn_blocking(move || normalize_image(&data))
            .await
            .map_err(|e| OcrError::ProcessingError(format!("Image decoding task failed: {}", e)))??;

        let result = self.provider.recognize(&png, &self.language).await?;

        tracing::debug!(
            provider = ?result.provider,
            confidence = result.confidence,
            chars = result.text.chars().count(),
            "OCR complete"
        );

        Ok(result)
    }
}

/// Decode an image and re-encode it as PNG
fn normalize_image(image_data: &[u8]) -> Result<Vec<u8>, OcrError> {
    let img = image::load_from_memory(image_data)
        .map_err(|e| OcrError::DecodeError(e.to_string()))?;

    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .map_err(|e| OcrError::ProcessingError(format!("Failed to encode image: {}", e)))?;

    Ok(buffer)
}

/// Language codes are alphanumeric with optional underscore/plus (e.g. "eng", "eng+deu", "chi_sim")
fn validate_language(lang: &str) -> Result<(), OcrError> {
    if lang.is_empty() || lang.len() > 20 {
        return Err(OcrError::InvalidLanguage(lang.to_string()));
    }
    if !lang
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '_')
    {
        return Err(OcrError::InvalidLanguage(lang.to_string()));
    }
    Ok(())
}
