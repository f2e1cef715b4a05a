pub mod health;
pub mod multipart;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::candidates::handlers as candidates;
use crate::import::handlers as import;
use crate::ingestion::handlers as ingestion;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Candidate browsing
        .route("/", get(candidates::handle_index))
        .route("/search", get(candidates::handle_search))
        .route("/shortlist", get(candidates::handle_shortlist))
        .route("/candidat/:id", get(candidates::handle_detail))
        // CV ingestion
        .route("/upload", post(ingestion::handle_upload))
        // CSV import
        .route("/import", get(import::handle_import_form))
        .route("/import-csv", post(import::handle_import_csv))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
