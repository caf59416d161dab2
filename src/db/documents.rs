//! Document record database operations

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;

/// Display format for upload timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Document record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    pub id: String,
    /// Storage key of the uploaded blob
    pub file: String,
    pub document_type: Option<String>,
    /// JSON object
    pub metadata: Option<String>,
    pub extracted_text: Option<String>,
    /// RFC 3339, UTC
    pub uploaded_at: String,
}

impl Document {
    /// Extracted text, empty when none was stored
    pub fn text(&self) -> &str {
        self.extracted_text.as_deref().unwrap_or("")
    }

    /// Parsed metadata object (`null` when absent)
    pub fn metadata_value(&self) -> Result<serde_json::Value> {
        match &self.metadata {
            Some(raw) => Ok(serde_json::from_str(raw)?),
            None => Ok(serde_json::Value::Null),
        }
    }

    /// Upload time as `YYYY-MM-DD HH:MM:SS` (UTC)
    pub fn uploaded_at_display(&self) -> String {
        DateTime::parse_from_rfc3339(&self.uploaded_at)
            .map(|dt| dt.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(|_| self.uploaded_at.clone())
    }
}

/// Create document request
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub file: String,
    pub document_type: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub extracted_text: Option<String>,
}

/// Row count for one document type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TypeCount {
    pub document_type: Option<String>,
    pub count: i64,
}

/// Document repository
pub struct DocumentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DocumentRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new document record
    pub async fn create(&self, data: &NewDocument) -> Result<Document> {
        let id = Uuid::new_v4().to_string();
        let uploaded_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let metadata = data
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO documents (id, file, document_type, metadata, extracted_text, uploaded_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&data.file)
        .bind(&data.document_type)
        .bind(&metadata)
        .bind(&data.extracted_text)
        .bind(&uploaded_at)
        .execute(self.pool)
        .await?;

        Ok(Document {
            id,
            file: data.file.clone(),
            document_type: data.document_type.clone(),
            metadata,
            extracted_text: data.extracted_text.clone(),
            uploaded_at,
        })
    }

    /// Get a specific document
    pub async fn get(&self, id: &str) -> Result<Option<Document>> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, file, document_type, metadata, extracted_text, uploaded_at
            FROM documents
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(document)
    }

    /// List all documents, newest first
    pub async fn list(&self) -> Result<Vec<Document>> {
        let documents = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, file, document_type, metadata, extracted_text, uploaded_at
            FROM documents
            ORDER BY uploaded_at DESC, rowid DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(documents)
    }

    /// Total number of documents
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Row counts per document type, largest first. Untyped rows form their own group.
    pub async fn count_by_type(&self) -> Result<Vec<TypeCount>> {
        let counts = sqlx::query_as::<_, TypeCount>(
            r#"
            SELECT document_type, COUNT(*) AS count
            FROM documents
            GROUP BY document_type
            ORDER BY count DESC, document_type ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(counts)
    }

    /// Case-insensitive substring search over the extracted text, in insertion order.
    ///
    /// Case folding is SQLite `LIKE`'s, which covers ASCII letters only:
    /// "ÉCOLE" does not match "école".
    pub async fn search_text(&self, query: &str) -> Result<Vec<Document>> {
        let pattern = format!("%{}%", escape_like(query));

        let documents = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, file, document_type, metadata, extracted_text, uploaded_at
            FROM documents
            WHERE extracted_text LIKE ? ESCAPE '\'
            ORDER BY rowid ASC
            "#,
        )
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        Ok(documents)
    }
}

/// Escape LIKE wildcards so the query matches literally
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn new_document(file: &str, document_type: Option<&str>, text: &str) -> NewDocument {
        NewDocument {
            file: file.to_string(),
            document_type: document_type.map(|t| t.to_string()),
            metadata: Some(serde_json::json!({ "format": "image" })),
            extracted_text: Some(text.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let pool = test_pool().await;
        let repo = DocumentRepository::new(&pool);

        let created = repo
            .create(&new_document("documents/invoice.png", Some("Invoice"), "Invoice #123"))
            .await
            .unwrap();

        let loaded = repo.get(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.file, "documents/invoice.png");
        assert_eq!(loaded.document_type.as_deref(), Some("Invoice"));
        assert_eq!(loaded.text(), "Invoice #123");
        assert_eq!(
            loaded.metadata_value().unwrap(),
            serde_json::json!({ "format": "image" })
        );
        assert_eq!(loaded.uploaded_at, created.uploaded_at);

        assert!(repo.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let pool = test_pool().await;
        let repo = DocumentRepository::new(&pool);

        let a = repo.create(&new_document("documents/a.png", None, "")).await.unwrap();
        let b = repo.create(&new_document("documents/a.png", None, "")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_count_by_type_includes_untyped_rows() {
        let pool = test_pool().await;
        let repo = DocumentRepository::new(&pool);

        for _ in 0..3 {
            repo.create(&new_document("documents/g.png", Some("General Document"), ""))
                .await
                .unwrap();
        }
        repo.create(&new_document("documents/i.png", Some("Invoice"), "invoice"))
            .await
            .unwrap();
        repo.create(&new_document("documents/x.png", None, "")).await.unwrap();
        repo.create(&new_document("documents/y.png", None, "")).await.unwrap();

        let counts = repo.count_by_type().await.unwrap();
        assert_eq!(
            counts,
            vec![
                TypeCount { document_type: Some("General Document".into()), count: 3 },
                TypeCount { document_type: None, count: 2 },
                TypeCount { document_type: Some("Invoice".into()), count: 1 },
            ]
        );

        let total: i64 = counts.iter().map(|c| c.count).sum();
        assert_eq!(total, repo.count().await.unwrap());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let pool = test_pool().await;
        let repo = DocumentRepository::new(&pool);

        let invoice = repo
            .create(&new_document("documents/a.png", Some("Invoice"), "Invoice #123 for ACME"))
            .await
            .unwrap();
        repo.create(&new_document("documents/b.png", None, "Certificate of Completion"))
            .await
            .unwrap();

        let upper = repo.search_text("INVOICE").await.unwrap();
        let lower = repo.search_text("invoice").await.unwrap();

        assert_eq!(upper.len(), 1);
        assert_eq!(upper[0].id, invoice.id);
        assert_eq!(
            upper.iter().map(|d| &d.id).collect::<Vec<_>>(),
            lower.iter().map(|d| &d.id).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_search_folds_ascii_case_only() {
        let pool = test_pool().await;
        let repo = DocumentRepository::new(&pool);

        repo.create(&new_document("documents/e.png", None, "école primaire")).await.unwrap();

        assert_eq!(repo.search_text("PRIMAIRE").await.unwrap().len(), 1);
        assert_eq!(repo.search_text("école").await.unwrap().len(), 1);
        assert!(repo.search_text("ÉCOLE").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_preserves_insertion_order() {
        let pool = test_pool().await;
        let repo = DocumentRepository::new(&pool);

        let first = repo.create(&new_document("documents/1.png", None, "report one")).await.unwrap();
        let second = repo.create(&new_document("documents/2.png", None, "report two")).await.unwrap();

        let results = repo.search_text("report").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, first.id);
        assert_eq!(results[1].id, second.id);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let pool = test_pool().await;
        let repo = DocumentRepository::new(&pool);

        repo.create(&new_document("documents/a.png", None, "100% complete")).await.unwrap();
        repo.create(&new_document("documents/b.png", None, "100 complete")).await.unwrap();
        repo.create(&new_document("documents/c.png", None, "file_name")).await.unwrap();
        repo.create(&new_document("documents/d.png", None, "filename")).await.unwrap();

        assert_eq!(repo.search_text("100%").await.unwrap().len(), 1);
        assert_eq!(repo.search_text("file_").await.unwrap().len(), 1);
        assert_eq!(repo.search_text("%").await.unwrap().len(), 1);
    }

    #[test]
    fn test_uploaded_at_display() {
        let document = Document {
            id: "id".into(),
            file: "documents/a.png".into(),
            document_type: None,
            metadata: None,
            extracted_text: None,
            uploaded_at: "2024-03-05T07:08:09.123456Z".into(),
        };
        assert_eq!(document.uploaded_at_display(), "2024-03-05 07:08:09");
        assert_eq!(document.text(), "");
        assert_eq!(document.metadata_value().unwrap(), serde_json::Value::Null);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
