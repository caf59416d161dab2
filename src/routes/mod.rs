//! Route modules for the document recognition server

pub mod documents;
pub mod files;
pub mod health;
pub mod search;
pub mod stats;
pub mod upload;


use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .merge(upload::router(state.config().server.max_upload_bytes))
        .merge(stats::router())
        .merge(search::router())
        .merge(documents::router());

    // Blobs are only served locally when MEDIA_URL is a path on this server
    if let Some(mount) = media_mount(&state.config().storage.media_url) {
        router = router.nest(&mount, files::router());
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// `/media/` -> `/media`; absolute URLs and `/` yield nothing
fn media_mount(media_url: &str) -> Option<String> {
    let trimmed = media_url.trim_end_matches('/');
    if trimmed.starts_with('/') {
        Some(trimmed.to_string())
    } else {
        None
    }
}
