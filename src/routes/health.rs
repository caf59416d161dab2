//! Health check endpoints

use axum::{extract::State, Json};
use serde::Serialize;

use crate::ocr::OcrProvider;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: &'static str,
    pub storage: &'static str,
    pub ocr: OcrHealth,
}

#[derive(Serialize)]
pub struct OcrHealth {
    pub provider: OcrProvider,
    pub available: bool,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: "doc-recognition-server",
        storage: state.blob_store().backend_name(),
        ocr: OcrHealth {
            provider: state.ocr().provider_type(),
            available: state.ocr().is_available().await,
        },
    })
}
