//! Upload area — where raw CV files are kept on disk.
//!
//! Files are stored under a generated name (`<uuid>-<sanitized name>`), so two
//! candidates uploading `cv.pdf` never overwrite each other.

use std::io;
use std::path::PathBuf;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

/// A file received from a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Name as declared by the client, reduced to its last path component.
    pub filename: String,
    pub content: Bytes,
}

impl UploadedFile {
    pub fn new(declared_name: &str, content: Bytes) -> Self {
        Self {
            filename: base_name(declared_name),
            content,
        }
    }
}

/// Where an upload landed on disk.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub path: PathBuf,
    /// File name inside the upload area, recorded on the candidate.
    pub stored_name: String,
}

#[derive(Debug, Clone)]
pub struct UploadArea {
    root: PathBuf,
}

impl UploadArea {
    /// Creates the directory if needed.
    pub async fn init(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        info!("Upload area ready at {}", root.display());
        Ok(Self { root })
    }

    pub async fn save(&self, file: &UploadedFile) -> io::Result<StoredUpload> {
        let stored_name = format!("{}-{}", Uuid::new_v4(), sanitize(&file.filename));
        let path = self.root.join(&stored_name);
        tokio::fs::write(&path, &file.content).await?;
        info!(
            "Stored upload '{}' ({} bytes) as {}",
            file.filename,
            file.content.len(),
            stored_name
        );
        Ok(StoredUpload { path, stored_name })
    }

    /// Removes an upload whose ingestion failed. Removal errors are logged, not returned.
    pub async fn discard(&self, stored: &StoredUpload) {
        match tokio::fs::remove_file(&stored.path).await {
            Ok(()) => info!("Discarded upload {}", stored.stored_name),
            Err(e) => warn!("Could not discard upload {}: {e}", stored.stored_name),
        }
    }
}

/// Last component of a client-supplied path, whichever separator the client used.
fn base_name(declared: &str) -> String {
    declared
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Keeps only characters that are safe in a file name on every platform.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
