use axum::{
    extract::{Multipart, State},
    response::Redirect,
};
use tracing::info;

use crate::errors::AppError;
use crate::ingestion::{ingest_cv, pipeline::UpsertAction};
use crate::routes::multipart::read_file_field;
use crate::state::AppState;

/// POST /upload
/// Runs the ingestion pipeline and redirects (303) to the candidate's page.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let file = read_file_field(multipart).await?;
    info!("Received CV upload '{}' ({} bytes)", file.filename, file.content.len());

    let outcome = ingest_cv(&state.db, &state.collaborators, &state.uploads, file).await?;
    if outcome.action == UpsertAction::Updated {
        info!("Candidate {} re-analyzed from a new CV", outcome.candidate_id);
    }

    Ok(Redirect::to(&format!("/candidat/{}", outcome.candidate_id)))
}
