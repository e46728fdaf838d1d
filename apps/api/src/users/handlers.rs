use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::models::user::{JobList, JobRef, ProfileFields, UserProfile};
use crate::state::AppState;
use crate::users::store;

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub email: String,
    #[serde(flatten)]
    pub fields: ProfileFields,
}

#[derive(Debug, Deserialize)]
pub struct JobRequest {
    pub email: String,
    #[serde(flatten)]
    pub job: JobRef,
}

#[derive(Debug, Serialize)]
pub struct SavedJobsResponse {
    pub saved_jobs: Vec<JobRef>,
}

#[derive(Debug, Serialize)]
pub struct AppliedJobsResponse {
    pub applied_jobs: Vec<JobRef>,
}

/// GET /api/getUserProfile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<EmailQuery>,
) -> Result<Json<UserProfile>, AppError> {
    info!(email = %params.email, "Get user profile request");
    let user = store::require_user(&state.db, &params.email).await?;
    Ok(Json(user.profile.0))
}

/// POST /api/updateUserProfile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    if req.fields.is_empty() {
        return Err(AppError::Validation("No fields to update".to_string()));
    }
    info!(email = %req.email, "Update user profile request");

    if !store::patch_profile(&state.db, &req.email, &req.fields.to_patch()).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    Ok(Json(json!({"message": "User profile updated successfully"})))
}

/// GET /api/getSavedJobs
pub async fn handle_get_saved_jobs(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<EmailQuery>,
) -> Result<Json<SavedJobsResponse>, AppError> {
    info!(email = %params.email, "Get saved jobs request");
    let user = store::require_user(&state.db, &params.email).await?;
    Ok(Json(SavedJobsResponse {
        saved_jobs: user.jobs(JobList::Saved).to_vec(),
    }))
}

/// GET /api/getAppliedJobs
pub async fn handle_get_applied_jobs(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<EmailQuery>,
) -> Result<Json<AppliedJobsResponse>, AppError> {
    info!(email = %params.email, "Get applied jobs request");
    let user = store::require_user(&state.db, &params.email).await?;
    Ok(Json(AppliedJobsResponse {
        applied_jobs: user.jobs(JobList::Applied).to_vec(),
    }))
}

/// POST /api/saveJob
pub async fn handle_save_job(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<JobRequest>,
) -> Result<Json<Value>, AppError> {
    add_to_list(&state, req, JobList::Saved).await?;
    Ok(Json(json!({"message": "Job saved successfully"})))
}

/// POST /api/applyJob
pub async fn handle_apply_job(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<JobRequest>,
) -> Result<Json<Value>, AppError> {
    add_to_list(&state, req, JobList::Applied).await?;
    Ok(Json(json!({"message": "Job applied successfully"})))
}

/// POST /api/unsaveJob
pub async fn handle_unsave_job(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<JobRequest>,
) -> Result<Json<Value>, AppError> {
    let job_id = required_job_id(&req.job)?;
    info!(email = %req.email, job_id, "Unsave job request");

    if !store::remove_job(&state.db, &req.email, JobList::Saved, job_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    Ok(Json(json!({"message": "Job unsaved successfully"})))
}

async fn add_to_list(state: &AppState, req: JobRequest, list: JobList) -> Result<(), AppError> {
    let mut job = req.job;
    job.job_id = required_job_id(&job)?.to_string();
    info!(email = %req.email, job_id = %job.job_id, list = list.column(), "Add job request");

    if !store::add_job(&state.db, &req.email, list, &job).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    Ok(())
}

fn required_job_id(job: &JobRef) -> Result<&str, AppError> {
    match job.job_id.trim() {
        "" => Err(AppError::Validation("job_id cannot be empty".to_string())),
        id => Ok(id),
    }
}
