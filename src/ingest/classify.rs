//! Format dispatch and document classification

use serde::{Deserialize, Serialize};

/// Text stored for PDF uploads; PDF extraction is not wired up
pub const PDF_PLACEHOLDER_TEXT: &str = "PDF processing to be implemented.";

/// Upload format, decided by file name suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Image,
    Pdf,
    Unknown,
}

impl FileFormat {
    /// Case-insensitive suffix check: `.png`/`.jpg`/`.jpeg` are images, `.pdf` is PDF.
    pub fn from_file_name(file_name: &str) -> Self {
        let lower = file_name.to_lowercase();
        if [".png", ".jpg", ".jpeg"].iter().any(|ext| lower.ends_with(ext)) {
            FileFormat::Image
        } else if lower.ends_with(".pdf") {
            FileFormat::Pdf
        } else {
            FileFormat::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Image => "image",
            FileFormat::Pdf => "pdf",
            FileFormat::Unknown => "unknown",
        }
    }
}

/// Document label derived from the extracted text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Invoice,
    Certificate,
    General,
}

impl DocumentType {
    /// First keyword hit wins: "invoice", then "certificate", case-insensitive.
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("invoice") {
            DocumentType::Invoice
        } else if lower.contains("certificate") {
            DocumentType::Certificate
        } else {
            DocumentType::General
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "Invoice",
            DocumentType::Certificate => "Certificate",
            DocumentType::General => "General Document",
        }
    }
}

/// Metadata stored with every document. Open mapping; `format` is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub format: FileFormat,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DocumentMetadata {
    pub fn new(format: FileFormat) -> Self {
        Self {
            format,
            extra: serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_by_suffix() {
        assert_eq!(FileFormat::from_file_name("invoice.png"), FileFormat::Image);
        assert_eq!(FileFormat::from_file_name("SCAN.JPG"), FileFormat::Image);
        assert_eq!(FileFormat::from_file_name("photo.Jpeg"), FileFormat::Image);
        assert_eq!(FileFormat::from_file_name("report.PDF"), FileFormat::Pdf);
        assert_eq!(FileFormat::from_file_name("readme.txt"), FileFormat::Unknown);
        assert_eq!(FileFormat::from_file_name("png"), FileFormat::Unknown);
        assert_eq!(FileFormat::from_file_name("archive.png.zip"), FileFormat::Unknown);
    }

    #[test]
    fn test_classify_order() {
        assert_eq!(DocumentType::classify("Invoice #123"), DocumentType::Invoice);
        assert_eq!(DocumentType::classify("CERTIFICATE of Completion"), DocumentType::Certificate);
        // invoice is checked first
        assert_eq!(
            DocumentType::classify("certificate attached to invoice"),
            DocumentType::Invoice
        );
        assert_eq!(DocumentType::classify(""), DocumentType::General);
        assert_eq!(DocumentType::classify("meeting notes"), DocumentType::General);
    }

    #[test]
    fn test_labels() {
        assert_eq!(DocumentType::Invoice.label(), "Invoice");
        assert_eq!(DocumentType::Certificate.label(), "Certificate");
        assert_eq!(DocumentType::General.label(), "General Document");
    }

    #[test]
    fn test_metadata_serialization() {
        let metadata = DocumentMetadata::new(FileFormat::Image);
        assert_eq!(
            serde_json::to_value(&metadata).unwrap(),
            serde_json::json!({ "format": "image" })
        );

        let parsed: DocumentMetadata =
            serde_json::from_value(serde_json::json!({ "format": "pdf", "pages": 3 })).unwrap();
        assert_eq!(parsed.format, FileFormat::Pdf);
        assert_eq!(parsed.extra.get("pages"), Some(&serde_json::json!(3)));
    }
}
