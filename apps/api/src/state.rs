use sqlx::SqlitePool;

use crate::config::Config;
use crate::ingestion::uploads::UploadArea;
use crate::ingestion::Collaborators;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    /// Extractor, analyzer, scorer and job requirements source used by uploads.
    pub collaborators: Collaborators,
    pub uploads: UploadArea,
}
