// src/health.rs
// =============================================================================
// A tiny HTTP server so the hosting platform (and the self-ping job) can see
// the process is alive. It knows nothing about scans.
// =============================================================================

use anyhow::{Context, Result};
use axum::{routing::get, Json, Router};
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
    })
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
}

// Serves the health routes until the process exits
pub async fn serve(port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind health server to port {}", port))?;

    tracing::info!("Health server listening on port {}", port);

    axum::serve(listener, router())
        .await
        .context("health server stopped")
}
