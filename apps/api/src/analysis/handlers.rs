//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::analysis::extract::extract_resume_text;
use crate::analysis::models::{AtsScoreResult, JobMatchResult, OptimizationResult};
use crate::errors::{AppError, AppJson};
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractTextResponse {
    pub resume_text: String,
}

/// POST /api/v1/analysis/job-match
pub async fn handle_job_match(
    State(state): State<AppState>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<JobMatchResult>, AppError> {
    let result = state.flows.job_match.run_json(&body).await?;
    Ok(Json(result))
}

/// POST /api/v1/analysis/ats-score
pub async fn handle_ats_score(
    State(state): State<AppState>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<AtsScoreResult>, AppError> {
    let result = state.flows.ats_score.run_json(&body).await?;
    Ok(Json(result))
}

/// POST /api/v1/analysis/optimize
pub async fn handle_optimize(
    State(state): State<AppState>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<OptimizationResult>, AppError> {
    let result = state.flows.optimize.run_json(&body).await?;
    Ok(Json(result))
}

/// POST /api/v1/resumes/extract-text
///
/// Multipart upload with a single `file` part. Other parts are ignored.
pub async fn handle_extract_text(mut multipart: Multipart) -> Result<Json<ExtractTextResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_owned);
        let file_name = field.file_name().map(str::to_owned);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read upload: {e}")))?;

        let resume_text = extract_resume_text(data, content_type.as_deref(), file_name.as_deref()).await?;
        return Ok(Json(ExtractTextResponse { resume_text }));
    }

    Err(AppError::Validation(format!("multipart field '{UPLOAD_FIELD}' is required")))
}
