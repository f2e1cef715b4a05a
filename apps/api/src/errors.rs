use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::candidates::store::StoreError;
use crate::import::ImportError;
use crate::ingestion::{IngestError, IngestErrorKind};
use crate::views::ErrorPage;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status, stable error code and user-facing message for this error.
    fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Ingest(e) => {
                let (status, code) = match e.kind() {
                    IngestErrorKind::Extraction => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_ERROR")
                    }
                    IngestErrorKind::Analysis => (StatusCode::BAD_GATEWAY, "ANALYSIS_ERROR"),
                    IngestErrorKind::Scoring => (StatusCode::BAD_GATEWAY, "SCORING_ERROR"),
                    IngestErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
                    IngestErrorKind::Storage => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
                    }
                };
                (status, code, format!("[{}] {e}", e.stage()))
            }
            AppError::Import(e) => match e {
                ImportError::Storage(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "The import could not be saved".to_string(),
                ),
                _ => (StatusCode::UNPROCESSABLE_ENTITY, "IMPORT_ERROR", e.to_string()),
            },
            AppError::Store(StoreError::Conflict { email }) => (
                StatusCode::CONFLICT,
                "CONFLICT",
                format!("A candidate with email {email} already exists"),
            ),
            AppError::Store(StoreError::Database(_))
            | AppError::Database(_)
            | AppError::Template(_)
            | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.classify();

        if status.is_server_error() {
            tracing::error!(code, "Request failed: {self:?}");
        } else {
            tracing::warn!(code, "Request rejected: {self}");
        }

        let page = ErrorPage {
            status: status.as_u16(),
            code,
            message: &message,
        };
        let body = page
            .render()
            .unwrap_or_else(|_| format!("{code}: {message}"));

        (status, Html(body)).into_response()
    }
}
