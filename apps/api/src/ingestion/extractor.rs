//! Text Extractor — turns a stored CV into plain text.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("could not read PDF {path}: {message}")]
    Unreadable { path: PathBuf, message: String },

    /// Typically a scanned document without a text layer.
    #[error("no text could be extracted from {path}")]
    NoText { path: PathBuf },
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Returns the concatenated plain text of every page.
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError>;
}

/// `pdf-extract` backed extractor. Parsing runs on the blocking pool; a panic inside
/// the parser on a corrupt file is reported as `Unreadable`.
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let owned = path.to_path_buf();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
            .await
            .map_err(|e| ExtractionError::Unreadable {
                path: path.to_path_buf(),
                message: format!("parser aborted: {e}"),
            })?
            .map_err(|e| ExtractionError::Unreadable {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if text.trim().is_empty() {
            return Err(ExtractionError::NoText {
                path: path.to_path_buf(),
            });
        }

        debug!("Extracted {} chars from {}", text.len(), path.display());
        Ok(text)
    }
}
