pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::chat::handlers as chat;
use crate::jobs::handlers as jobs;
use crate::onboarding::handlers as onboarding;
use crate::state::AppState;
use crate::users::handlers as users;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Onboarding
        .route(
            "/api/onboardFileUpload",
            post(onboarding::handle_upload)
                .layer(DefaultBodyLimit::max(onboarding::MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/confirmOnboardingDetails",
            post(onboarding::handle_confirm),
        )
        // Profile & job tracking
        .route("/api/getUserProfile", get(users::handle_get_profile))
        .route("/api/updateUserProfile", post(users::handle_update_profile))
        .route("/api/getSavedJobs", get(users::handle_get_saved_jobs))
        .route("/api/getAppliedJobs", get(users::handle_get_applied_jobs))
        .route("/api/saveJob", post(users::handle_save_job))
        .route("/api/unsaveJob", post(users::handle_unsave_job))
        .route("/api/applyJob", post(users::handle_apply_job))
        .route("/api/jobDetails", get(jobs::handle_job_details))
        // Chat
        .route("/api/chatHistoryRequest", get(chat::handle_chat_history))
        .route("/api/deleteChatSession", post(chat::handle_delete_chat))
        .route("/api/createChat", post(chat::handle_create_chat))
        .route("/api/sendMessage", post(chat::handle_send_message))
        .route("/api/getChatMessages", get(chat::handle_get_chat_messages))
        .with_state(state)
}
