// HTTP route handlers for the Blockrun server

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use blockrun_common::{BlockOutcome, CodeBlock, ExecutionRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};
use uuid::Uuid;

use crate::metrics;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExecuteAllRequest {
    #[serde(default)]
    pub code_blocks: Vec<CodeBlock>,
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub started_at: String,
    pub uptime_secs: u64,
}

/// POST /execute - Execute a single code block
pub async fn execute(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExecutionRequest>,
) -> impl IntoResponse {
    let execution_id = Uuid::new_v4();
    debug!(
        %execution_id,
        language = %payload.language,
        block_id = %payload.block_id,
        ordered = payload.execute_in_order,
        "received execute request"
    );

    metrics::record_block_submitted(&payload.language);
    let started = Instant::now();

    match state.orchestrator.execute(&payload).await {
        Ok(output) => {
            let elapsed_ms = started.elapsed().as_millis() as f64;
            metrics::record_block_completed(&payload.language, "success", elapsed_ms);
            debug!(%execution_id, "code executed successfully");
            (StatusCode::OK, Json(json!({ "output": output })))
        }
        Err(e) if e.is_client_error() => {
            metrics::record_block_rejected("validation");
            error!(%execution_id, "{}", e);
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
        }
        Err(e) => {
            let elapsed_ms = started.elapsed().as_millis() as f64;
            metrics::record_block_completed(&payload.language, "error", elapsed_ms);
            error!(%execution_id, "error executing code: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}

/// POST /execute_all - Execute a batch of code blocks against one language
pub async fn execute_all(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExecuteAllRequest>,
) -> impl IntoResponse {
    debug!(
        language = %payload.language,
        blocks = payload.code_blocks.len(),
        "received execute_all request"
    );

    for _ in &payload.code_blocks {
        metrics::record_block_submitted(&payload.language);
    }
    let started = Instant::now();

    match state
        .orchestrator
        .execute_batch(&payload.language, &payload.code_blocks)
        .await
    {
        Ok(results) => {
            metrics::record_execution_time(&payload.language, started.elapsed().as_millis() as f64);
            for outcome in results.values() {
                let label = match outcome {
                    BlockOutcome::Success { .. } => "success",
                    BlockOutcome::Failure { .. } => "error",
                };
                metrics::record_block_outcome(&payload.language, label);
            }
            (StatusCode::OK, Json(json!(results)))
        }
        Err(e) => {
            metrics::record_block_rejected("validation");
            error!("{}", e);
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
        }
    }
}

/// GET /health - Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok",
        started_at: state.started_at.to_rfc3339(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    };
    (StatusCode::OK, Json(response))
}

/// GET /metrics - Prometheus metrics in text format
pub async fn metrics_text() -> impl IntoResponse {
    (StatusCode::OK, metrics::render_metrics())
}
