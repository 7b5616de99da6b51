//! HTTP surface: router, shared state, and the upload handler.
//!
//! One route does the work: `POST /upload` accepts a multipart form with a
//! `file` field, persists it, runs the extraction pipeline, and answers
//! with the combined result or a JSON error body. `GET /healthz` exists
//! for container orchestrators.
//!
//! CORS is fully permissive — the service fronts a browser UI served from
//! a different origin.

mod handlers;

use crate::config::AppConfig;
use crate::model::VisionModel;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Uploads above this size are rejected before the handler runs.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared per-process state: the config and the model client.
pub struct AppState {
    pub config: AppConfig,
    pub model: Arc<dyn VisionModel>,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/upload", post(handlers::upload))
        .route("/healthz", get(handlers::healthz))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `0.0.0.0:port` and serve until the process exits.
pub async fn serve(state: Arc<AppState>, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("listening on http://{addr}");
    axum::serve(listener, router(state)).await
}
