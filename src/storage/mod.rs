//! Blob storage for uploaded files
//!
//! Uploads are written once under `<upload_prefix>/<file name>` and never
//! overwritten. Two backends are available:
//! - local filesystem (default, rooted at `MEDIA_ROOT`)
//! - S3-compatible buckets (MinIO, Cloudflare R2, Backblaze B2, AWS S3)

mod local;
mod s3_client;
mod types;

pub use local::LocalStorage;
pub use s3_client::S3Client;
pub use types::*;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::StorageError;

/// How many alternative names are tried before giving up on a save
const MAX_NAME_ATTEMPTS: usize = 16;

/// Length of the random suffix appended on name collisions
const SUFFIX_LEN: usize = 7;

/// Fallback name when sanitizing leaves nothing usable
const FALLBACK_NAME: &str = "upload";

// ============================================================================
// Storage Trait
// ============================================================================

/// Trait for blob storage backends
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Short backend name for logging
    fn backend_name(&self) -> &'static str;

    /// Write a new object. Fails with `StorageError::AlreadyExists` when the key is taken.
    async fn put_new(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), StorageError>;

    /// Read an object
    async fn get(&self, key: &str) -> Result<StorageObject, StorageError>;

    /// Check whether a key is taken
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;
}

// ============================================================================
// Blob Store
// ============================================================================

/// Blob store with a pluggable backend
#[derive(Clone)]
pub struct BlobStore {
    inner: Arc<BlobStoreInner>,
}

struct BlobStoreInner {
    backend: Box<dyn BlobStorage>,
    upload_prefix: String,
    media_url: String,
}

impl BlobStore {
    /// Create with local filesystem storage
    pub fn with_local_storage(
        media_root: PathBuf,
        upload_prefix: impl Into<String>,
        media_url: impl Into<String>,
    ) -> Self {
        Self::with_backend(Box::new(LocalStorage::new(media_root)), upload_prefix, media_url)
    }

    /// Create with S3 storage
    pub fn with_s3_storage(
        client: S3Client,
        upload_prefix: impl Into<String>,
        media_url: impl Into<String>,
    ) -> Self {
        Self::with_backend(Box::new(client), upload_prefix, media_url)
    }

    fn with_backend(
        backend: Box<dyn BlobStorage>,
        upload_prefix: impl Into<String>,
        media_url: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(BlobStoreInner {
                backend,
                upload_prefix: upload_prefix.into().trim_matches('/').to_string(),
                media_url: media_url.into().trim_end_matches('/').to_string(),
            }),
        }
    }

    /// Build the store selected by configuration
    pub async fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        match config.backend {
            StorageBackend::Local => Ok(Self::with_local_storage(
                config.media_root.clone(),
                config.upload_prefix.clone(),
                config.media_url.clone(),
            )),
            StorageBackend::S3 => {
                let s3 = config.s3.as_ref().ok_or_else(|| {
                    StorageError::ConnectionFailed("S3 backend selected without bucket settings".to_string())
                })?;
                let client = S3Client::new(s3).await?;
                Ok(Self::with_s3_storage(
                    client,
                    config.upload_prefix.clone(),
                    config.media_url.clone(),
                ))
            }
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.inner.backend.backend_name()
    }

    /// Save an upload and return the key it was stored under.
    ///
    /// The key is derived from the upload prefix and the sanitized file name.
    /// When that key is taken, a random suffix is added before the extension.
    pub async fn save(
        &self,
        file_name: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        let name = valid_file_name(file_name);
        let mut key = self.key_for(&name);

        for _ in 0..MAX_NAME_ATTEMPTS {
            match self.inner.backend.put_new(&key, data, content_type).await {
                Ok(()) => {
                    tracing::debug!(
                        key = %key,
                        size = data.len(),
                        backend = self.backend_name(),
                        "Stored upload"
                    );
                    return Ok(key);
                }
                Err(StorageError::AlreadyExists(taken)) => {
                    tracing::debug!(key = %taken, "Storage key taken, picking another name");
                    key = self.key_for(&alternative_name(&name));
                }
                Err(e) => return Err(e),
            }
        }

        Err(StorageError::AlreadyExists(key))
    }

    /// Read a stored object back
    pub async fn open(&self, key: &str) -> Result<StorageObject, StorageError> {
        self.inner.backend.get(key).await
    }

    pub async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.backend.exists(key).await
    }

    /// Public URL a stored key is served under
    pub fn url(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.inner.media_url, encoded.join("/"))
    }

    fn key_for(&self, name: &str) -> String {
        if self.inner.upload_prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.inner.upload_prefix, name)
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Reduce a client-supplied file name to a safe single path segment
pub fn valid_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();

    if cleaned.chars().all(|c| c == '.') {
        FALLBACK_NAME.to_string()
    } else {
        cleaned
    }
}

/// `name.ext` -> `name_abc1234.ext`
pub fn alternative_name(name: &str) -> String {
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(SUFFIX_LEN)
        .collect();

    match name.rfind('.') {
        Some(idx) if idx > 0 => format!("{}_{}{}", &name[..idx], suffix, &name[idx..]),
        _ => format!("{}_{}", name, suffix),
    }
}

// ============================================================================
// Tests
// ============================================================================
