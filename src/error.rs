//! Error types for the medreport-extract library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExtractError`] — **Fatal**: the request cannot proceed at all
//!   (unsupported file type, unreadable upload, bad configuration).
//!   Surfaced to the HTTP client as a 4xx/5xx response.
//!
//! * [`PageError`] — **Non-fatal**: a single page degraded to an empty
//!   result (render glitch, model transport error, unparsable reply).
//!   Stored inside [`crate::output::PageOutcome`] so the combined result
//!   is still produced; the HTTP surface never exposes these directly.
//!
//! The separation keeps the best-effort contract honest: a page failure is
//! recorded and logged, but only the caller decides whether "empty" is an
//! acceptable answer.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the medreport-extract library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::output::PageOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The uploaded file's extension is not one the dispatcher handles.
    ///
    /// `extension` includes the leading dot (`.gif`), or is empty when the
    /// filename has no extension at all.
    #[error("Unsupported file type: {extension}. Please upload a PDF, JPEG, or PNG file.")]
    UnsupportedFileType { extension: String },

    /// The persisted upload could not be read back from disk.
    #[error("Failed to read uploaded file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A non-fatal error for a single page.
///
/// Stored alongside the page's (empty) data in
/// [`crate::output::PageOutcome`]. The overall request continues.
#[derive(Debug, Clone, Error)]
pub enum PageError {
    /// PDF rasterisation failed; the whole document collapsed to one empty page.
    #[error("page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// JPEG re-encoding of a rendered page failed.
    #[error("page {page}: image encoding failed: {detail}")]
    EncodeFailed { page: usize, detail: String },

    /// The model call failed (transport, API, or empty reply).
    #[error("page {page}: model call failed: {detail}")]
    ModelFailed { page: usize, detail: String },

    /// The model replied, but no JSON object could be parsed out of it.
    #[error("page {page}: reply was not valid JSON: {detail}")]
    UnparsableReply { page: usize, detail: String },
}

/// Errors from a [`crate::model::VisionModel`] call.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The HTTP request itself failed (connect, timeout, TLS, body read).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The API answered 200 but the reply carried no candidate text.
    #[error("reply contained no candidate text")]
    EmptyReply,
}

/// Errors from PDF rasterisation.
///
/// Absorbed by the dispatcher into the empty-page-list fallback; these
/// never cross the HTTP boundary.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No usable pdfium library could be bound.
    #[error("failed to bind pdfium library: {0}")]
    Binding(String),

    /// The document could not be opened (corrupt or not a PDF).
    #[error("failed to open PDF: {0}")]
    Open(String),

    /// A specific page failed to render.
    #[error("failed to render page {page}: {detail}")]
    Page { page: usize, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_file_type_names_extension() {
        let e = ExtractError::UnsupportedFileType {
            extension: ".gif".into(),
        };
        assert_eq!(
            e.to_string(),
            "Unsupported file type: .gif. Please upload a PDF, JPEG, or PNG file."
        );
    }

    #[test]
    fn page_error_display_carries_page_number() {
        let e = PageError::ModelFailed {
            page: 3,
            detail: "timed out".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("page 3"), "got: {msg}");
        assert!(msg.contains("timed out"));
    }
}
