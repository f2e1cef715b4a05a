use axum::{
    extract::{Multipart, State},
    response::Html,
};
use tracing::info;

use crate::errors::AppError;
use crate::import::import_csv;
use crate::routes::multipart::read_file_field;
use crate::state::AppState;
use crate::views::{render, ImportPage, ImportResultPage};

/// GET /import
pub async fn handle_import_form(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&ImportPage {
        policy: state.config.import_policy,
    })
}

/// POST /import-csv
pub async fn handle_import_csv(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let file = read_file_field(multipart).await?;
    info!("Received CSV import '{}' ({} bytes)", file.filename, file.content.len());

    let summary = import_csv(&state.db, &file.content, state.config.import_policy).await?;
    render(&ImportResultPage { summary })
}
