//! Local filesystem blob storage

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::StorageError;

use super::{BlobStorage, StorageObject};

/// Local filesystem storage rooted at the media directory
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Resolve a key below the base path. Keys that would escape it are treated as missing.
    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_plain {
            return Err(StorageError::ObjectNotFound(key.to_string()));
        }

        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl BlobStorage for LocalStorage {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn put_new(&self, key: &str, data: &[u8], _content_type: &str) -> Result<(), StorageError> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // create_new makes the existence check and the write a single step
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyExists(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        file.write_all(data).await?;
        file.flush().await?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StorageObject, StorageError> {
        let path = self.object_path(key)?;
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::ObjectNotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(StorageObject {
            key: key.to_string(),
            size: data.len() as u64,
            content_type: None,
            data,
        })
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = match self.object_path(key) {
            Ok(path) => path,
            Err(_) => return Ok(false),
        };
        Ok(tokio::fs::try_exists(&path).await?)
    }
}
