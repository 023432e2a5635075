pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use crate::pipeline::AnalysisPipeline;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnalysisPipeline>,
}

impl AppState {
    pub fn new(pipeline: AnalysisPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/health", get(handlers::health))
        .route("/api/analyze-transcript", post(handlers::analyze_transcript))
        .route("/api/records", get(handlers::list_records))
        .route("/api/records/stats", get(handlers::record_stats))
        .route("/api/records/export", get(handlers::export_records))
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Call Transcript Analyzer API listening on http://{}", addr);

    axum::serve(listener, build_router(state))
        .await
        .context("HTTP server terminated")
}
