use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;

use crate::errors::AppError;
use crate::ingestion::uploads::UploadedFile;

/// Form field carrying the uploaded file on every upload form.
pub const FILE_FIELD: &str = "file";

/// Reads the `file` field of a multipart form, rejecting missing, unnamed or empty files.
pub async fn read_file_field(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| rejection(e, "Invalid multipart body"))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let declared = field.file_name().unwrap_or_default().to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| rejection(e, "Could not read the uploaded file"))?;

        let file = UploadedFile::new(&declared, content);
        if file.filename.is_empty() {
            return Err(AppError::Validation("The uploaded file has no name".into()));
        }
        if file.content.is_empty() {
            return Err(AppError::Validation(format!(
                "The uploaded file '{}' is empty",
                file.filename
            )));
        }
        return Ok(file);
    }

    Err(AppError::Validation(format!(
        "No '{FILE_FIELD}' field in the form"
    )))
}

/// Bodies over the configured upload limit are 413; anything else malformed is 400.
fn rejection(err: MultipartError, context: &str) -> AppError {
    let message = format!("{context}: {err}");
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::Validation(message)
    }
}
