//! File dispatch: route an upload by extension and drive the per-page loop.
//!
//! PDFs fan out into one model call per rendered page; JPEG/PNG uploads go
//! to the model as-is. Pages are processed strictly sequentially — a report
//! is a handful of pages and the per-page calls are the only slow step, so
//! there is nothing worth coordinating.
//!
//! Every per-page failure (render, encode, model, parse) is absorbed into
//! an empty [`PageOutcome`] carrying the reason; only an unsupported
//! extension or an unreadable upload fails the whole request.

use crate::config::AppConfig;
use crate::error::{ExtractError, PageError};
use crate::model::VisionModel;
use crate::output::PageOutcome;
use crate::pipeline::{encode, parse, render};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// MIME type asserted for every model call.
///
/// Non-PDF uploads are forwarded with this type even when the file is
/// actually a PNG; Gemini sniffs the real encoding from the bytes, but
/// integrators relying on the declared type should be aware of the
/// mislabel.
pub const IMAGE_MIME: &str = "image/jpeg";

/// Process an uploaded file into ordered per-page outcomes.
///
/// Dispatch is by lowercased extension: `.pdf` rasterises and extracts
/// page by page; `.jpg`/`.jpeg`/`.png` submit the raw bytes as a single
/// page 1. Any other extension is an [`ExtractError::UnsupportedFileType`].
pub async fn process_file(
    path: &Path,
    model: &Arc<dyn VisionModel>,
    config: &AppConfig,
) -> Result<Vec<PageOutcome>, ExtractError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();

    match extension.as_str() {
        ".pdf" => process_pdf(path, model, config).await,
        ".jpg" | ".jpeg" | ".png" => {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|source| ExtractError::FileRead {
                    path: path.to_path_buf(),
                    source,
                })?;
            Ok(vec![extract_page(model, 1, &bytes).await])
        }
        _ => Err(ExtractError::UnsupportedFileType { extension }),
    }
}

/// Rasterise a PDF and extract each page.
///
/// A rasterisation failure or an empty document both collapse to a single
/// empty page-1 outcome; the caller's empty-result check turns that into a
/// user-facing extraction error.
async fn process_pdf(
    path: &Path,
    model: &Arc<dyn VisionModel>,
    config: &AppConfig,
) -> Result<Vec<PageOutcome>, ExtractError> {
    let images = match render::render_pages(path, config.max_rendered_pixels).await {
        Ok(images) => images,
        Err(e) => {
            warn!("PDF rasterisation failed: {e}");
            return Ok(vec![PageOutcome::empty(
                1,
                Some(PageError::RenderFailed {
                    page: 1,
                    detail: e.to_string(),
                }),
            )]);
        }
    };

    if images.is_empty() {
        return Ok(vec![PageOutcome::empty(1, None)]);
    }

    let mut outcomes = Vec::with_capacity(images.len());
    for (idx, image) in images.iter().enumerate() {
        let page = idx + 1;
        info!("Processing page {page} of {}", images.len());

        let outcome = match encode::encode_jpeg(image) {
            Ok(bytes) => extract_page(model, page, &bytes).await,
            Err(e) => PageOutcome::empty(
                page,
                Some(PageError::EncodeFailed {
                    page,
                    detail: e.to_string(),
                }),
            ),
        };
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

/// One model call plus reply parsing, degraded to empty on any failure.
async fn extract_page(model: &Arc<dyn VisionModel>, page: usize, image: &[u8]) -> PageOutcome {
    let start = Instant::now();

    let raw = match model.generate(image, IMAGE_MIME).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("page {page}: model call failed: {e}");
            return PageOutcome::empty(
                page,
                Some(PageError::ModelFailed {
                    page,
                    detail: e.to_string(),
                }),
            );
        }
    };

    info!(
        page,
        elapsed_ms = start.elapsed().as_millis() as u64,
        reply_bytes = raw.len(),
        "page extracted"
    );

    match parse::parse_extraction(&raw) {
        Ok(data) => PageOutcome {
            page,
            data,
            error: None,
        },
        Err(e) => {
            warn!("page {page}: reply was not valid JSON: {e}");
            PageOutcome::empty(
                page,
                Some(PageError::UnparsableReply {
                    page,
                    detail: e.to_string(),
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedModel {
        reply: String,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl VisionModel for ScriptedModel {
        async fn generate(&self, _image: &[u8], _mime: &str) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl VisionModel for FailingModel {
        async fn generate(&self, _image: &[u8], _mime: &str) -> Result<String, ModelError> {
            Err(ModelError::EmptyReply)
        }
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, data: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    #[tokio::test]
    async fn gif_extension_is_rejected_without_a_model_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "report.gif", b"GIF89a");
        let scripted = Arc::new(ScriptedModel::new("{}"));
        let model: Arc<dyn VisionModel> = scripted.clone();

        let err = process_file(&path, &model, &AppConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractError::UnsupportedFileType { ref extension } if extension == ".gif"
        ));
        assert_eq!(scripted.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn extension_is_lowercased_before_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "report.GIF", b"GIF89a");
        let model: Arc<dyn VisionModel> = Arc::new(ScriptedModel::new("{}"));

        let err = process_file(&path, &model, &AppConfig::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported file type: .gif. Please upload a PDF, JPEG, or PNG file."
        );
    }

    #[tokio::test]
    async fn jpeg_upload_yields_single_page_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "report.jpg", &[0xFF, 0xD8, 0xFF, 0xE0]);
        let model: Arc<dyn VisionModel> = Arc::new(ScriptedModel::new(
            r#"{"key_value_pairs": {"Age": "42"}, "extracted_tests": {}}"#,
        ));

        let outcomes = process_file(&path, &model, &AppConfig::default())
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].page, 1);
        assert_eq!(
            outcomes[0].data.key_value_pairs["Age"],
            serde_json::json!("42")
        );
        assert!(outcomes[0].error.is_none());
    }

    #[tokio::test]
    async fn model_failure_degrades_to_empty_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "report.png", b"\x89PNG\r\n");
        let model: Arc<dyn VisionModel> = Arc::new(FailingModel);

        let outcomes = process_file(&path, &model, &AppConfig::default())
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].data.is_empty());
        assert!(matches!(
            outcomes[0].error,
            Some(PageError::ModelFailed { page: 1, .. })
        ));
    }

    #[tokio::test]
    async fn prose_reply_degrades_to_empty_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "report.jpeg", &[0xFF, 0xD8]);
        let model: Arc<dyn VisionModel> =
            Arc::new(ScriptedModel::new("No medical data found, sorry."));

        let outcomes = process_file(&path, &model, &AppConfig::default())
            .await
            .unwrap();
        assert!(outcomes[0].data.is_empty());
        assert!(matches!(
            outcomes[0].error,
            Some(PageError::UnparsableReply { .. })
        ));
    }

    #[tokio::test]
    async fn unopenable_pdf_collapses_to_single_empty_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "report.pdf", b"this is not a pdf");
        let model: Arc<dyn VisionModel> = Arc::new(ScriptedModel::new("{}"));

        let outcomes = process_file(&path, &model, &AppConfig::default())
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].page, 1);
        assert!(outcomes[0].data.is_empty());
    }

    #[tokio::test]
    async fn extensionless_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "report", b"bytes");
        let model: Arc<dyn VisionModel> = Arc::new(ScriptedModel::new("{}"));

        let err = process_file(&path, &model, &AppConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractError::UnsupportedFileType { ref extension } if extension.is_empty()
        ));
    }
}
