//! ETL routes
//!
//! The start endpoints accept a job and return immediately; the admin UI then
//! polls `/logs` (reference client: every 5 seconds) until the status turns
//! terminal. A rejected start is a non-fatal condition the client retries.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use dataport_etl::{EtlOrchestrator, JobKind, StartError};

/// Create ETL routes
pub fn etl_routes() -> Router<EtlOrchestrator> {
    Router::new()
        .route("/import", post(run_import))
        .route("/export", post(run_export))
        .route("/logs", get(get_logs))
        .route("/status", get(get_status))
}

/// Start an import job
///
/// POST /import -> 202 Accepted | 409 Conflict
async fn run_import(State(orchestrator): State<EtlOrchestrator>) -> Response {
    start_job(&orchestrator, JobKind::Import)
}

/// Start an export job
///
/// POST /export -> 202 Accepted | 409 Conflict
async fn run_export(State(orchestrator): State<EtlOrchestrator>) -> Response {
    start_job(&orchestrator, JobKind::Export)
}

fn start_job(orchestrator: &EtlOrchestrator, kind: JobKind) -> Response {
    match orchestrator.start(kind) {
        Ok(started) => (
            StatusCode::ACCEPTED,
            Json(json!({
                "message": format!("{kind} process started in background"),
                "job_id": started.job_id,
            })),
        )
            .into_response(),
        Err(error @ StartError::Busy { .. }) => {
            tracing::warn!(%kind, "start rejected: {error}");
            (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": {
                        "message": error.to_string(),
                        "status": StatusCode::CONFLICT.as_u16(),
                    }
                })),
            )
                .into_response()
        }
    }
}

/// Snapshot of the current job log
///
/// GET /logs -> 200 OK, even when idle (empty text)
async fn get_logs(State(orchestrator): State<EtlOrchestrator>) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "logs": orchestrator.log_text() })),
    )
        .into_response()
}

/// Current job status record
///
/// GET /status -> 200 OK
async fn get_status(State(orchestrator): State<EtlOrchestrator>) -> Response {
    (StatusCode::OK, Json(orchestrator.status())).into_response()
}
