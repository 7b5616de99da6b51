//! PDF rasterisation: render every page to a `DynamicImage` via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto a thread
//! designed for blocking operations so the server's worker threads keep
//! accepting requests while a document renders.
//!
//! Errors here never reach the HTTP client: the dispatcher absorbs any
//! `RenderError` into the single-empty-page fallback.

use crate::error::RenderError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Rasterise every page of a PDF into images, in page order.
///
/// `max_pixels` caps the longer rendered edge regardless of the page's
/// physical size, keeping memory and upload size bounded.
pub async fn render_pages(
    pdf_path: &Path,
    max_pixels: u32,
) -> Result<Vec<DynamicImage>, RenderError> {
    let path = pdf_path.to_path_buf();

    tokio::task::spawn_blocking(move || render_pages_blocking(&path, max_pixels))
        .await
        .map_err(|e| RenderError::Open(format!("render task panicked: {e}")))?
}

/// Blocking implementation of page rendering.
fn render_pages_blocking(pdf_path: &Path, max_pixels: u32) -> Result<Vec<DynamicImage>, RenderError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| RenderError::Binding(format!("{e:?}")))?;
    let pdfium = Pdfium::new(bindings);

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| RenderError::Open(format!("{e:?}")))?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut results = Vec::with_capacity(pages.len() as usize);

    for (idx, page) in pages.iter().enumerate() {
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| RenderError::Page {
                page: idx + 1,
                detail: format!("{e:?}"),
            })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        results.push(image);
    }

    Ok(results)
}
