use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::extract::ApiQuery;
use crate::jobs::cards::JobCard;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobDetailsQuery {
    pub job_id: String,
    pub country: Option<String>,
}

/// GET /api/jobDetails
pub async fn handle_job_details(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<JobDetailsQuery>,
) -> Result<Json<JobCard>, AppError> {
    let job_id = params.job_id.trim();
    if job_id.is_empty() {
        return Err(AppError::Validation("job_id cannot be empty".to_string()));
    }
    info!(job_id, "Job details request");

    let country = params
        .country
        .unwrap_or_else(|| state.config.jsearch_country.clone());
    let card = state
        .jobs
        .job_details(job_id, &country)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    Ok(Json(card))
}
