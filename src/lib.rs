//! # medreport-extract
//!
//! Extract structured data from medical-report images and PDFs with a
//! vision LLM, exposed as an HTTP upload endpoint.
//!
//! Classic OCR falls apart on lab-report layouts — multi-column panels,
//! units glued to values, reference ranges beside results. Instead each
//! page is rasterised and handed to a vision model that reads it the way a
//! human would, returning the fields as JSON.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (multipart)
//!  │
//!  ├─ 1. Persist   write the file into the upload directory
//!  ├─ 2. Dispatch  route by extension (.pdf / .jpg / .jpeg / .png)
//!  ├─ 3. Render    rasterise PDF pages via pdfium (spawn_blocking)
//!  ├─ 4. Encode    page image → JPEG bytes
//!  ├─ 5. Model     one Gemini generateContent call per page, no retry
//!  ├─ 6. Parse     ```json fence (or bare JSON) → ExtractionResult
//!  └─ 7. Combine   merge pages last-write-wins → {"data": …}
//! ```
//!
//! Per-page failures never fail the request: a broken page degrades to an
//! empty [`PageOutcome`] carrying the reason, and the combined result is
//! built from whatever survived. Only an unsupported file type or an
//! unreadable upload is an error.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use medreport_extract::{serve, AppConfig, AppState, GeminiClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::default();
//!     let key = GeminiClient::api_key_from_env().expect("GEMINI_API_KEY not set");
//!     let client = GeminiClient::new(key, &config)?;
//!     let state = Arc::new(AppState { config, model: Arc::new(client) });
//!     serve(state, 5000).await?;
//!     Ok(())
//! }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{AppConfig, AppConfigBuilder};
pub use error::{ExtractError, ModelError, PageError, RenderError};
pub use model::{GeminiClient, VisionModel};
pub use output::{combine, ExtractionResult, PageOutcome};
pub use pipeline::dispatch::process_file;
pub use server::{router, serve, AppState};
