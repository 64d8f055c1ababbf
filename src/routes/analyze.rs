use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::analysis::{AnalyzeRequest, AnalyzeResponse, JobStatusResponse};
use crate::models::job::JobStatus;

/// POST /analyze: Submit startup data for weakness analysis.
pub async fn submit_analysis(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, StatusCode> {
    if let Err(report) = request.validate() {
        tracing::info!(errors = %report, "Rejected invalid startup data");
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let job_id = state.orchestrator.submit(request.startup_data);

    Ok(Json(AnalyzeResponse {
        job_id,
        status: JobStatus::Queued.to_string(),
        message: "Weaknesses analysis queued successfully".to_string(),
    }))
}

/// GET /results/{job_id}: Check analysis job status and result.
pub async fn get_results(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatusResponse>, StatusCode> {
    let job_id = Uuid::parse_str(&job_id).map_err(|_| StatusCode::NOT_FOUND)?;

    let job = state.jobs.get(job_id).map_err(|e| {
        tracing::debug!(error = %e, "Analysis job lookup failed");
        StatusCode::NOT_FOUND
    })?;

    Ok(Json(JobStatusResponse::from(job)))
}
