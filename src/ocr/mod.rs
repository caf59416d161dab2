//! OCR Module
//!
//! Extracts plain text from uploaded images through an external engine.
//!
//! Supports multiple backends:
//! - Tesseract (local binary, path configurable via `TESSERACT_CMD`)
//! - Ollama vision models (local LLM)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use doc_recognition_server::config::OcrConfig;
//! use doc_recognition_server::ocr::OcrService;
//!
//! let service = OcrService::from_config(&OcrConfig::default());
//! let result = service.extract_text(&image_bytes).await?;
//! println!("{}", result.text);
//! ```

mod provider;
mod service;
mod types;

pub use provider::{OcrProviderTrait, OllamaProvider, TesseractProvider};
pub use service::OcrService;
pub use types::{OcrError, OcrProvider, OcrResult};

#[cfg(test)]
pub(crate) use provider::MockProvider;
#[cfg(test)]
pub(crate) use service::tests::sample_png;
