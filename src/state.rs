//! Application state management

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::ocr::OcrService;
use crate::storage::BlobStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pub config: Config,
    pub blob_store: BlobStore,
    pub db: SqlitePool,
    pub ocr: OcrService,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config, blob_store: BlobStore, db: SqlitePool, ocr: OcrService) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                blob_store,
                db,
                ocr,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the blob store
    pub fn blob_store(&self) -> &BlobStore {
        &self.inner.blob_store
    }

    /// Get the database pool
    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    /// Get the OCR service
    pub fn ocr(&self) -> &OcrService {
        &self.inner.ocr
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ocr::OcrProviderTrait;
    use tempfile::TempDir;

    /// State backed by an in-memory database, a temp media root and the given OCR provider.
    /// Keep the returned `TempDir` alive for the duration of the test.
    pub(crate) async fn test_state<P: OcrProviderTrait + 'static>(provider: P) -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();

        let mut config = Config::default();
        config.storage.media_root = temp_dir.path().to_path_buf();

        let blob_store = BlobStore::with_local_storage(
            config.storage.media_root.clone(),
            config.storage.upload_prefix.clone(),
            config.storage.media_url.clone(),
        );
        let db = crate::db::test_pool().await;
        let ocr = OcrService::new(Arc::new(provider), &config.ocr.language);

        (AppState::new(config, blob_store, db, ocr), temp_dir)
    }
}
