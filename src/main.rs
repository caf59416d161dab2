//! Document Recognition Server
//!
//! Upload documents, extract their text with OCR, search and count them.

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doc_recognition_server::config::Config;
use doc_recognition_server::ocr::OcrService;
use doc_recognition_server::state::AppState;
use doc_recognition_server::storage::BlobStore;
use doc_recognition_server::{app, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "doc_recognition_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    // Optional variables fall back to defaults; incomplete S3 settings stop startup
    let config = Config::from_env().context("Invalid configuration")?;

    tracing::info!("Starting Document Recognition Server v{}", env!("CARGO_PKG_VERSION"));

    let blob_store = BlobStore::from_config(&config.storage)
        .await
        .context("Failed to initialize blob storage")?;
    tracing::info!("Blob storage backend: {}", blob_store.backend_name());

    let db_pool = db::create_pool(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database initialized at {}", config.database.url);

    let ocr = OcrService::from_config(&config.ocr);
    if ocr.is_available().await {
        tracing::info!("OCR provider {:?} ready", ocr.provider_type());
    } else {
        tracing::warn!(
            "OCR provider {:?} is not reachable, image uploads will fail until it is",
            ocr.provider_type()
        );
    }

    let addr = config.bind_address();
    let app_state = AppState::new(config, blob_store, db_pool, ocr);
    let router = app(app_state);

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Document Recognition Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
