//! Configuration management for the document recognition server

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::ocr::OcrProvider;

/// Default request body limit for uploads: 25MB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Configuration errors. Optional variables fall back to defaults and never fail.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set when STORAGE_BACKEND=s3")]
    MissingS3Var(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted upload body in bytes
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Root directory for the local backend
    pub media_root: PathBuf,
    /// Public URL prefix blobs are served under
    pub media_url: String,
    /// Key prefix every upload is stored under
    pub upload_prefix: String,
    /// Bucket settings, required when `backend` is `s3`
    pub s3: Option<S3Config>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    S3,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// OCR engine settings, injected into the ingestion path at startup
#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    pub provider: OcrProvider,
    /// Path to the tesseract executable (default: "tesseract" - uses PATH)
    pub tesseract_cmd: String,
    /// Language passed to the engine
    pub language: String,
    pub ollama_url: String,
    pub ollama_model: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            provider: OcrProvider::Tesseract,
            tesseract_cmd: "tesseract".to_string(),
            language: "eng".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llava".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            storage: StorageConfig {
                backend: StorageBackend::Local,
                media_root: PathBuf::from("./media"),
                media_url: "/media".to_string(),
                upload_prefix: "documents".to_string(),
                s3: None,
            },
            database: DatabaseConfig {
                url: "sqlite:./documents.db".to_string(),
            },
            ocr: OcrConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let backend = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "s3" => StorageBackend::S3,
            _ => StorageBackend::Local,
        };

        // Bucket credentials are only required once the S3 backend is selected
        let s3 = match backend {
            StorageBackend::S3 => Some(S3Config {
                endpoint: required_s3_var("S3_ENDPOINT")?,
                bucket: required_s3_var("S3_BUCKET")?,
                access_key: required_s3_var("S3_ACCESS_KEY")?,
                secret_key: required_s3_var("S3_SECRET_KEY")?,
                region: env::var("S3_REGION").ok(),
            }),
            StorageBackend::Local => None,
        };

        let provider = match env::var("OCR_PROVIDER")
            .unwrap_or_else(|_| "tesseract".to_string())
            .to_lowercase()
            .as_str()
        {
            "ollama" => OcrProvider::Ollama,
            _ => OcrProvider::Tesseract,
        };

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(defaults.server.port),
                max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.server.max_upload_bytes),
            },
            storage: StorageConfig {
                backend,
                media_root: env::var("MEDIA_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.media_root),
                media_url: env::var("MEDIA_URL").unwrap_or(defaults.storage.media_url),
                upload_prefix: env::var("UPLOAD_PREFIX").unwrap_or(defaults.storage.upload_prefix),
                s3,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
            },
            ocr: OcrConfig {
                provider,
                tesseract_cmd: env::var("TESSERACT_CMD").unwrap_or(defaults.ocr.tesseract_cmd),
                language: env::var("OCR_LANGUAGE").unwrap_or(defaults.ocr.language),
                ollama_url: env::var("OLLAMA_URL").unwrap_or(defaults.ocr.ollama_url),
                ollama_model: env::var("OLLAMA_MODEL").unwrap_or(defaults.ocr.ollama_model),
            },
        })
    }

    /// Address string the listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn required_s3_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingS3Var(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Tests touching the process environment run one at a time
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_VARS: &[&str] = &[
        "SERVER_HOST",
        "SERVER_PORT",
        "MAX_UPLOAD_BYTES",
        "STORAGE_BACKEND",
        "MEDIA_ROOT",
        "MEDIA_URL",
        "UPLOAD_PREFIX",
        "S3_ENDPOINT",
        "S3_BUCKET",
        "S3_ACCESS_KEY",
        "S3_SECRET_KEY",
        "S3_REGION",
        "DATABASE_URL",
        "OCR_PROVIDER",
        "TESSERACT_CMD",
        "OCR_LANGUAGE",
        "OLLAMA_URL",
        "OLLAMA_MODEL",
    ];

    /// Load config with exactly `vars` set among the known variables
    fn from_vars(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        for name in ENV_VARS {
            env::remove_var(name);
        }
        for (name, value) in vars {
            env::set_var(name, value);
        }

        let result = Config::from_env();

        for name in ENV_VARS {
            env::remove_var(name);
        }
        result
    }

    #[test]
    fn test_from_env_without_vars_matches_defaults() {
        let config = from_vars(&[]).unwrap();
        let defaults = Config::default();

        assert_eq!(config.bind_address(), defaults.bind_address());
        assert_eq!(config.server.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert_eq!(config.storage.media_root, defaults.storage.media_root);
        assert_eq!(config.database.url, defaults.database.url);
        assert_eq!(config.ocr.provider, OcrProvider::Tesseract);
        assert_eq!(config.ocr.language, "eng");
    }

    #[test]
    fn test_from_env_reads_every_section() {
        let config = from_vars(&[
            ("SERVER_HOST", "127.0.0.1"),
            ("SERVER_PORT", "9000"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("MEDIA_ROOT", "/srv/media"),
            ("MEDIA_URL", "https://cdn.example.com/media"),
            ("UPLOAD_PREFIX", "scans"),
            ("DATABASE_URL", "sqlite:/var/lib/docs.db"),
            ("OCR_PROVIDER", "OLLAMA"),
            ("TESSERACT_CMD", "/opt/tess"),
            ("OCR_LANGUAGE", "eng+deu"),
            ("OLLAMA_URL", "http://ollama:11434"),
            ("OLLAMA_MODEL", "bakllava"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.server.max_upload_bytes, 1024);
        assert_eq!(config.storage.media_root, PathBuf::from("/srv/media"));
        assert_eq!(config.storage.media_url, "https://cdn.example.com/media");
        assert_eq!(config.storage.upload_prefix, "scans");
        assert_eq!(config.database.url, "sqlite:/var/lib/docs.db");
        assert_eq!(config.ocr.provider, OcrProvider::Ollama);
        assert_eq!(config.ocr.tesseract_cmd, "/opt/tess");
        assert_eq!(config.ocr.language, "eng+deu");
        assert_eq!(config.ocr.ollama_url, "http://ollama:11434");
        assert_eq!(config.ocr.ollama_model, "bakllava");
    }

    #[test]
    fn test_unparsable_numbers_fall_back() {
        let config = from_vars(&[("SERVER_PORT", "http"), ("MAX_UPLOAD_BYTES", "-1")]).unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_s3_backend_with_bucket_settings() {
        let config = from_vars(&[
            ("STORAGE_BACKEND", "S3"),
            ("S3_ENDPOINT", "http://minio:9000"),
            ("S3_BUCKET", "documents"),
            ("S3_ACCESS_KEY", "access"),
            ("S3_SECRET_KEY", "secret"),
        ])
        .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::S3);
        let s3 = config.storage.s3.unwrap();
        assert_eq!(s3.endpoint, "http://minio:9000");
        assert_eq!(s3.bucket, "documents");
        assert_eq!(s3.region, None);
    }

    #[test]
    fn test_s3_backend_missing_bucket_is_an_error() {
        let result = from_vars(&[
            ("STORAGE_BACKEND", "s3"),
            ("S3_ENDPOINT", "http://minio:9000"),
            ("S3_ACCESS_KEY", "access"),
            ("S3_SECRET_KEY", "secret"),
            ("TESSERACT_CMD", "/opt/tess"),
        ]);

        match result {
            Err(ConfigError::MissingS3Var(name)) => assert_eq!(name, "S3_BUCKET"),
            Ok(config) => panic!("expected an error, got {:?}", config.storage),
        }

        let result = from_vars(&[("STORAGE_BACKEND", "s3"), ("S3_ENDPOINT", "  ")]);
        assert!(matches!(result, Err(ConfigError::MissingS3Var("S3_ENDPOINT"))));
    }

    #[test]
    fn test_s3_vars_ignored_for_local_backend() {
        let config = from_vars(&[("S3_BUCKET", "documents")]).unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert!(config.storage.s3.is_none());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert_eq!(config.storage.upload_prefix, "documents");
        assert!(config.storage.s3.is_none());
        assert_eq!(config.ocr.provider, OcrProvider::Tesseract);
        assert_eq!(config.ocr.tesseract_cmd, "tesseract");
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_storage_backend_deserialize() {
        let backend: StorageBackend = serde_json::from_str("\"s3\"").unwrap();
        assert_eq!(backend, StorageBackend::S3);

        let backend: StorageBackend = serde_json::from_str("\"local\"").unwrap();
        assert_eq!(backend, StorageBackend::Local);
    }
}
