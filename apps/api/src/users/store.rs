use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{normalize_email, JobList, JobRef, UserProfile, UserRow};

/// Result of an onboarding upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upserted {
    pub id: Uuid,
    pub created: bool,
}

pub async fn find_user(pool: &PgPool, email: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as("SELECT id, profile, saved_jobs, applied_jobs FROM users WHERE email = $1")
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await
}

/// Loads a user or fails with 404.
pub async fn require_user(pool: &PgPool, email: &str) -> Result<UserRow, AppError> {
    find_user(pool, email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Inserts or replaces the profile keyed by its email.
/// Job lists and chats of an existing user are left alone.
pub async fn upsert_profile(pool: &PgPool, profile: &UserProfile) -> Result<Upserted, sqlx::Error> {
    let email = normalize_email(&profile.email);
    let mut profile = profile.clone();
    profile.email = email.clone();

    let (id, created): (Uuid, bool) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, profile)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE
            SET profile = EXCLUDED.profile, updated_at = now()
        RETURNING id, (xmax = 0) AS created
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(Json(&profile))
    .fetch_one(pool)
    .await?;

    Ok(Upserted { id, created })
}

/// Shallow-merges `patch` into the stored profile. Returns whether the user exists.
pub async fn patch_profile(pool: &PgPool, email: &str, patch: &Value) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET profile = profile || $2, updated_at = now() WHERE email = $1",
    )
    .bind(normalize_email(email))
    .bind(Json(patch))
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Adds `job` to `list` unless an entry with the same `job_id` is already there.
/// Returns whether the user exists.
pub async fn add_job(
    pool: &PgPool,
    email: &str,
    list: JobList,
    job: &JobRef,
) -> Result<bool, sqlx::Error> {
    let column = list.column();
    let sql = format!(
        r#"
        UPDATE users
        SET {column} = CASE
                WHEN {column} @> jsonb_build_array(jsonb_build_object('job_id', $2::text))
                    THEN {column}
                ELSE {column} || jsonb_build_array($3::jsonb)
            END,
            updated_at = now()
        WHERE email = $1
        "#
    );
    let result = sqlx::query(&sql)
        .bind(normalize_email(email))
        .bind(&job.job_id)
        .bind(Json(job))
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Removes every entry with `job_id` from `list`. Returns whether the user exists.
pub async fn remove_job(
    pool: &PgPool,
    email: &str,
    list: JobList,
    job_id: &str,
) -> Result<bool, sqlx::Error> {
    let column = list.column();
    let sql = format!(
        r#"
        UPDATE users
        SET {column} = COALESCE(
                (SELECT jsonb_agg(job) FROM jsonb_array_elements({column}) AS job
                 WHERE job->>'job_id' <> $2),
                '[]'::jsonb),
            updated_at = now()
        WHERE email = $1
        "#
    );
    let result = sqlx::query(&sql)
        .bind(normalize_email(email))
        .bind(job_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
