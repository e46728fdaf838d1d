use std::future::Future;

use axum::{extract::State, Json};
use bytes::Bytes;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::llm_client::ChatModel;
use crate::models::user::{normalize_email, UserProfile};
use crate::onboarding::extractor::extract_profile;
use crate::onboarding::resume_parser::{archive_resume, extract_text};
use crate::state::AppState;
use crate::users::store::upsert_profile;

/// Request bodies above this are rejected on the upload route.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// POST /api/onboardFileUpload
/// Raw PDF body in, profile preview out. Nothing is stored in the database.
pub async fn handle_upload(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<UserProfile>, AppError> {
    info!(bytes = body.len(), "Résumé upload");
    let text = extract_text(body.clone()).await?;

    let profile = preview_profile(state.llm.as_ref(), &text, || {
        archive_resume(&state.s3, &state.config.s3_bucket, body)
    })
    .await?;
    Ok(Json(profile))
}

/// Extracts the profile, and only once that succeeded archives the PDF.
async fn preview_profile<A, F>(
    model: &dyn ChatModel,
    text: &str,
    archive: A,
) -> Result<UserProfile, AppError>
where
    A: FnOnce() -> F,
    F: Future<Output = Option<String>>,
{
    let mut profile = extract_profile(model, text).await?;
    profile.resume_key = archive().await;
    Ok(profile)
}

/// POST /api/confirmOnboardingDetails
pub async fn handle_confirm(
    State(state): State<AppState>,
    ApiJson(profile): ApiJson<UserProfile>,
) -> Result<Json<Value>, AppError> {
    let email = validated_email(&profile.email)?;
    let upserted = upsert_profile(&state.db, &profile).await?;

    if upserted.created {
        info!(user_id = %upserted.id, "User onboarded");
        Ok(Json(json!({
            "message": "User onboarded successfully",
            "id": upserted.id,
        })))
    } else {
        info!(user_id = %upserted.id, "User details updated");
        Ok(Json(json!({
            "message": "User details updated successfully",
            "email": email,
        })))
    }
}

fn validated_email(raw: &str) -> Result<String, AppError> {
    let email = normalize_email(raw);
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation(
            "A valid email is required".to_string(),
        ));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::llm_client::{LlmError, LlmResponse, ToolSpec, Turn};

    struct ReplyModel(Option<&'static str>);

    #[async_trait]
    impl ChatModel for ReplyModel {
        async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.0.map(str::to_string).ok_or(LlmError::EmptyContent)
        }

        async fn converse(
            &self,
            _system: &str,
            _turns: &[Turn],
            _tools: &[ToolSpec],
        ) -> Result<LlmResponse, LlmError> {
            Err(LlmError::EmptyContent)
        }
    }

    #[tokio::test]
    async fn test_failed_extraction_skips_archive() {
        let archived = AtomicBool::new(false);
        let flag = &archived;
        let result = preview_profile(&ReplyModel(None), "Alex Johnson", move || async move {
            flag.store(true, Ordering::SeqCst);
            Some("resumes/x.pdf".to_string())
        })
        .await;

        assert!(matches!(result, Err(AppError::Llm(_))));
        assert!(!archived.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_preview_carries_archive_key() {
        let model = ReplyModel(Some(r#"{"name": "Alex Johnson", "email": "alex@example.com"}"#));
        let profile = preview_profile(&model, "Alex Johnson", || async {
            Some("resumes/x.pdf".to_string())
        })
        .await
        .unwrap();

        assert_eq!(profile.name, "Alex Johnson");
        assert_eq!(profile.resume_key.as_deref(), Some("resumes/x.pdf"));
    }

    #[test]
    fn test_validated_email() {
        assert_eq!(validated_email(" Alex@Example.com ").unwrap(), "alex@example.com");
        assert!(matches!(validated_email(""), Err(AppError::Validation(_))));
        assert!(matches!(validated_email("alex"), Err(AppError::Validation(_))));
    }
}
