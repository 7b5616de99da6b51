//! HTTP server binary for medreport-extract.
//!
//! A thin shim over the library crate: maps CLI flags and environment
//! variables to `AppConfig`, wires up the Gemini client, and serves.

use anyhow::{Context, Result};
use clap::Parser;
use medreport_extract::{serve, AppConfig, AppState, GeminiClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Extract structured data from uploaded medical reports using a vision LLM.
#[derive(Parser, Debug)]
#[command(
    name = "medreport-server",
    version,
    about = "Medical-report extraction service backed by the Gemini vision API",
    long_about = "Accepts medical-report uploads (PDF, JPEG, PNG) on POST /upload, sends each \
page to the Gemini vision API with a fixed extraction prompt, and responds with the merged \
key/value and test-result mappings as JSON."
)]
struct Cli {
    /// Listen port.
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Directory uploaded files are stored in (created if absent).
    #[arg(long, env = "MEDREPORT_UPLOAD_DIR", default_value = "Uploads")]
    upload_dir: PathBuf,

    /// Gemini model id.
    #[arg(long, env = "MEDREPORT_MODEL", default_value = "gemini-1.5-flash")]
    model: String,

    /// Per-model-call timeout in seconds.
    #[arg(long, env = "MEDREPORT_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Maximum rendered page dimension in pixels.
    #[arg(long, env = "MEDREPORT_MAX_PIXELS", default_value_t = 2000)]
    max_pixels: u32,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MEDREPORT_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = AppConfig::builder()
        .upload_dir(&cli.upload_dir)
        .model(&cli.model)
        .api_timeout_secs(cli.api_timeout)
        .max_rendered_pixels(cli.max_pixels)
        .build()
        .context("Invalid configuration")?;

    std::fs::create_dir_all(&config.upload_dir).with_context(|| {
        format!(
            "Failed to create upload directory '{}'",
            config.upload_dir.display()
        )
    })?;

    // ── Model client ─────────────────────────────────────────────────────
    let api_key = GeminiClient::api_key_from_env()
        .context("No API key found. Set GEMINI_API_KEY (or the legacy gemini_api).")?;
    let client = GeminiClient::new(api_key, &config).context("Failed to build Gemini client")?;

    // ── Serve ────────────────────────────────────────────────────────────
    let state = Arc::new(AppState {
        config,
        model: Arc::new(client),
    });
    serve(state, cli.port).await.context("Server error")?;

    Ok(())
}
