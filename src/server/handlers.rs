//! Request handlers and their error-to-response mapping.

use super::AppState;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::ExtractError;
use crate::output::{combine, ExtractionResult};
use crate::pipeline::dispatch;

/// Successful response body: the combined extraction wrapped in `data`.
#[derive(Serialize)]
struct UploadResponse {
    data: ExtractionResult,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Everything that can go wrong inside the upload handler, with its
/// user-facing message as the `Display` form.
#[derive(Debug, Error)]
enum UploadError {
    #[error("No file part in the request")]
    MissingFilePart,

    #[error("No file selected")]
    NoFileSelected,

    #[error("Unsupported file type: {extension}. Please upload a PDF, JPEG, or PNG file.")]
    Unsupported { extension: String },

    #[error("Failed to extract data from the file. Ensure the file contains readable medical report data.")]
    NothingExtracted,

    #[error("Processing failed: {0}")]
    Processing(String),
}

impl UploadError {
    fn status(&self) -> StatusCode {
        match self {
            UploadError::MissingFilePart
            | UploadError::NoFileSelected
            | UploadError::Unsupported { .. } => StatusCode::BAD_REQUEST,
            UploadError::NothingExtracted | UploadError::Processing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<ExtractError> for UploadError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::UnsupportedFileType { extension } => {
                UploadError::Unsupported { extension }
            }
            other => UploadError::Processing(other.to_string()),
        }
    }
}

/// `POST /upload` — receive a report file, extract, combine, respond.
pub(super) async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Response {
    match handle_upload(&state, multipart).await {
        Ok(data) => (StatusCode::OK, Json(UploadResponse { data })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `GET /healthz` — liveness probe.
pub(super) async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn handle_upload(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<ExtractionResult, UploadError> {
    // ── Receive ──────────────────────────────────────────────────────────
    let mut upload: Option<(String, axum::body::Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Processing(e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| UploadError::Processing(e.to_string()))?;
            upload = Some((filename, bytes));
        } else {
            // Drain unknown fields so the stream stays consumable.
            let _ = field.bytes().await;
        }
    }

    let (filename, bytes) = upload.ok_or(UploadError::MissingFilePart)?;
    if filename.is_empty() {
        return Err(UploadError::NoFileSelected);
    }

    // ── Persist ──────────────────────────────────────────────────────────
    // Client-supplied name, reduced to its final path component so an
    // embedded path cannot escape the upload directory. Same-named files
    // are overwritten; nothing is ever deleted.
    let safe_name = Path::new(&filename)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or(UploadError::NoFileSelected)?;
    let dest = state.config.upload_dir.join(&safe_name);

    tokio::fs::write(&dest, &bytes)
        .await
        .map_err(|e| UploadError::Processing(format!("failed to store upload: {e}")))?;
    info!(file = %safe_name, bytes = bytes.len(), "upload persisted");

    // ── Dispatch ─────────────────────────────────────────────────────────
    let outcomes = dispatch::process_file(&dest, &state.model, &state.config).await?;

    // ── Empty-result check ───────────────────────────────────────────────
    // A lone empty page means either the model genuinely found nothing or
    // some stage failed; the response deliberately does not distinguish
    // the two, but the reason is logged when there is one.
    if outcomes.is_empty() || (outcomes.len() == 1 && outcomes[0].data.is_empty()) {
        if let Some(reason) = outcomes.first().and_then(|o| o.error.as_ref()) {
            warn!(file = %safe_name, "extraction yielded nothing: {reason}");
        }
        return Err(UploadError::NothingExtracted);
    }

    // ── Combine ──────────────────────────────────────────────────────────
    Ok(combine(outcomes))
}
