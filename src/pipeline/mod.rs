//! Pipeline stages between an uploaded file and its combined result.
//!
//! Each submodule implements exactly one transformation step, which keeps
//! every stage independently testable:
//!
//! ```text
//! upload ──▶ dispatch ──▶ render ──▶ encode ──▶ model ──▶ parse
//! (file)    (by ext)     (pdfium)   (JPEG)     (Gemini)  (JSON)
//! ```
//!
//! 1. [`dispatch`] — route by file extension and drive the per-page loop
//! 2. [`render`]   — rasterise PDF pages; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 3. [`encode`]   — re-encode each rendered page as JPEG bytes for the
//!    multimodal request body
//! 4. [`parse`]    — pull the JSON object out of the model's text reply
//!
//! The model call itself lives in [`crate::model`]; it is the only stage
//! with network I/O.

pub mod dispatch;
pub mod encode;
pub mod parse;
pub mod render;
