//! Ingestion pipeline
//!
//! One upload goes through four sequential steps:
//! store the blob, extract text (OCR for images, placeholder for PDFs),
//! classify the text, insert the document record.
//!
//! OCR failures abort before the insert, so no record exists for them.
//! The blob written in the first step is left behind in that case.

mod classify;

pub use classify::{DocumentMetadata, DocumentType, FileFormat, PDF_PLACEHOLDER_TEXT};

use axum::body::Bytes;

use crate::db::{Document, DocumentRepository, NewDocument};
use crate::error::Result;
use crate::ocr::OcrError;
use crate::state::AppState;

/// A received file part
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original client file name
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Result of a successful ingestion
#[derive(Debug, Clone)]
pub struct IngestedDocument {
    pub document: Document,
    pub document_type: DocumentType,
    pub metadata: DocumentMetadata,
    pub extracted_text: String,
}

/// Run one upload through the pipeline
pub async fn ingest(state: &AppState, upload: Upload) -> Result<IngestedDocument> {
    let content_type = upload.content_type.clone().unwrap_or_else(|| {
        mime_guess::from_path(&upload.file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    });

    let key = state
        .blob_store()
        .save(&upload.file_name, &upload.data, &content_type)
        .await?;

    let format = FileFormat::from_file_name(&upload.file_name);

    let extracted_text = match format {
        FileFormat::Image => extract_image_text(state, &key).await.map_err(|e| {
            tracing::error!(
                key = %key,
                file_name = %upload.file_name,
                error = %e,
                "OCR failed, no document recorded"
            );
            e
        })?,
        FileFormat::Pdf => PDF_PLACEHOLDER_TEXT.to_string(),
        FileFormat::Unknown => String::new(),
    };

    let document_type = DocumentType::classify(&extracted_text);
    let metadata = DocumentMetadata::new(format);

    let document = DocumentRepository::new(state.db())
        .create(&NewDocument {
            file: key,
            document_type: Some(document_type.label().to_string()),
            metadata: Some(serde_json::to_value(&metadata)?),
            extracted_text: Some(extracted_text.clone()),
        })
        .await?;

    tracing::info!(
        document_id = %document.id,
        file = %document.file,
        format = format.as_str(),
        document_type = document_type.label(),
        size = upload.data.len(),
        "Document ingested"
    );

    Ok(IngestedDocument {
        document,
        document_type,
        metadata,
        extracted_text,
    })
}

/// Read the stored image back and run it through the OCR engine
async fn extract_image_text(state: &AppState, key: &str) -> std::result::Result<String, OcrError> {
    let object = state
        .blob_store()
        .open(key)
        .await
        .map_err(|e| OcrError::ReadError(e.to_string()))?;

    let result = state.ocr().extract_text(&object.data).await?;

    Ok(result.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{sample_png, MockProvider};
    use crate::state::tests::test_state;

    fn upload(file_name: &str, data: Vec<u8>) -> Upload {
        Upload {
            file_name: file_name.to_string(),
            content_type: None,
            data: Bytes::from(data),
        }
    }

    #[tokio::test]
    async fn test_image_upload_is_classified_from_ocr_text() {
        let (state, _dir) = test_state(MockProvider::returning("Invoice #123")).await;

        let ingested = ingest(&state, upload("invoice.png", sample_png())).await.unwrap();

        assert_eq!(ingested.document_type, DocumentType::Invoice);
        assert_eq!(ingested.metadata, DocumentMetadata::new(FileFormat::Image));
        assert_eq!(ingested.extracted_text, "Invoice #123");
        assert_eq!(ingested.document.file, "documents/invoice.png");
        assert_eq!(ingested.document.document_type.as_deref(), Some("Invoice"));
    }

    #[tokio::test]
    async fn test_pdf_upload_gets_placeholder() {
        let (state, _dir) = test_state(MockProvider::failing("OCR must not run for PDFs")).await;

        let ingested = ingest(&state, upload("Report.PDF", b"%PDF-1.4".to_vec())).await.unwrap();

        assert_eq!(ingested.extracted_text, PDF_PLACEHOLDER_TEXT);
        assert_eq!(ingested.metadata.format, FileFormat::Pdf);
        assert_eq!(ingested.document_type, DocumentType::General);
    }

    #[tokio::test]
    async fn test_unknown_format_has_empty_text() {
        let (state, _dir) = test_state(MockProvider::failing("OCR must not run")).await;

        let ingested = ingest(&state, upload("readme.txt", b"invoice".to_vec())).await.unwrap();

        assert_eq!(ingested.extracted_text, "");
        assert_eq!(ingested.metadata.format, FileFormat::Unknown);
        assert_eq!(ingested.document_type, DocumentType::General);
        assert_eq!(ingested.document.metadata.as_deref(), Some(r#"{"format":"unknown"}"#));
    }

    #[tokio::test]
    async fn test_ocr_failure_creates_no_record() {
        let (state, _dir) = test_state(MockProvider::failing("engine crashed")).await;

        let result = ingest(&state, upload("scan.jpg", sample_png())).await;

        assert!(matches!(result, Err(crate::error::AppError::Ocr(_))));
        assert_eq!(DocumentRepository::new(state.db()).count().await.unwrap(), 0);
        // the blob stays behind
        assert!(state.blob_store().exists("documents/scan.jpg").await.unwrap());
    }
}
