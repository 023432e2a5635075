use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::StoreError;
use crate::models::{AnalysisRecord, HistoryStats, PipelineOutcome, Stage, StageFailure};
use crate::server::AppState;
use crate::store::{load_records, records_to_csv, RecordStore};

#[derive(Debug, Deserialize)]
pub struct TranscriptRequest {
    pub transcript: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub transcript: String,
    pub summary: String,
    pub sentiment: String,
    pub success: bool,
}

/// Body returned for a failed analysis
///
/// `summary` and `sentiment` are only present when the analysis itself
/// succeeded and saving it did not.
#[derive(Debug, Serialize)]
pub struct FailureResponse {
    pub error: String,
    pub stage: &'static str,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// A stored record as listed by the history endpoint
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    /// 1-based position in append order
    pub index: usize,
    pub transcript: String,
    pub summary: String,
    pub sentiment: String,
}

fn status_for(stage: Stage) -> StatusCode {
    match stage {
        Stage::Validate => StatusCode::BAD_REQUEST,
        Stage::Summarize | Stage::Sentiment => StatusCode::BAD_GATEWAY,
        Stage::Persist => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for StageFailure {
    fn into_response(self) -> Response {
        let status = status_for(self.stage);
        let (summary, sentiment) = match self.unsaved {
            Some(result) => (Some(result.summary), Some(result.sentiment)),
            None => (None, None),
        };

        let body = FailureResponse {
            error: self.reason.to_string(),
            stage: self.stage.label(),
            success: false,
            summary,
            sentiment,
        };

        (status, Json(body)).into_response()
    }
}

impl IntoResponse for PipelineOutcome {
    fn into_response(self) -> Response {
        match self {
            PipelineOutcome::Success(result) => Json(TranscriptResponse {
                transcript: result.transcript,
                summary: result.summary,
                sentiment: result.sentiment,
                success: true,
            })
            .into_response(),
            PipelineOutcome::Failure(failure) => failure.into_response(),
        }
    }
}

/// Store read failure on a history endpoint
pub struct HistoryError(StoreError);

impl IntoResponse for HistoryError {
    fn into_response(self) -> Response {
        error!("Error reading record store: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": self.0.to_string(),
                "success": false,
            })),
        )
            .into_response()
    }
}

async fn read_history(store: Arc<dyn RecordStore>) -> Result<Vec<AnalysisRecord>, HistoryError> {
    tokio::task::spawn_blocking(move || load_records(store.as_ref()))
        .await
        .map_err(|e| HistoryError(StoreError::Unavailable(format!("read task failed: {}", e))))?
        .map_err(HistoryError)
}

/// GET /
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Call Transcript Analyzer API",
        "health": "/api/health",
        "analyze": "/api/analyze-transcript",
        "records": "/api/records",
    }))
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    info!("Health check requested");
    Json(HealthResponse {
        status: "Healthy",
        message: "Call Transcript Analyzer API is running",
    })
}

/// POST /api/analyze-transcript
pub async fn analyze_transcript(
    State(state): State<AppState>,
    Json(request): Json<TranscriptRequest>,
) -> PipelineOutcome {
    info!("Transcript analysis requested");
    state.pipeline.analyze(&request.transcript).await
}

/// GET /api/records
pub async fn list_records(
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryEntry>>, HistoryError> {
    let records = read_history(state.pipeline.store()).await?;

    let entries = records
        .into_iter()
        .enumerate()
        .map(|(i, r)| HistoryEntry {
            index: i + 1,
            transcript: r.transcript,
            summary: r.summary,
            sentiment: r.sentiment,
        })
        .collect();

    Ok(Json(entries))
}

/// GET /api/records/stats
pub async fn record_stats(
    State(state): State<AppState>,
) -> Result<Json<HistoryStats>, HistoryError> {
    let records = read_history(state.pipeline.store()).await?;
    Ok(Json(HistoryStats::from_records(&records)))
}

/// GET /api/records/export
pub async fn export_records(State(state): State<AppState>) -> Response {
    let csv = match read_history(state.pipeline.store()).await {
        Ok(records) => records_to_csv(&records),
        Err(e) => return e.into_response(),
    };

    match csv {
        Ok(body) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"call_analysis.csv\"",
                ),
            ],
            body,
        )
            .into_response(),
        Err(e) => HistoryError(e).into_response(),
    }
}
