//! Stats API routes

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::db::{DocumentRepository, TypeCount};
use crate::error::Result;
use crate::state::AppState;

/// Create the stats router
pub fn router() -> Router<AppState> {
    Router::new().route("/stats/", get(document_stats))
}

/// Stats response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_documents: i64,
    /// One entry per distinct type, untyped documents included as `null`
    pub document_types: Vec<TypeCount>,
}

/// GET /stats/
async fn document_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let repo = DocumentRepository::new(state.db());

    let total_documents = repo.count().await?;
    let document_types = repo.count_by_type().await?;

    Ok(Json(StatsResponse {
        total_documents,
        document_types,
    }))
}
