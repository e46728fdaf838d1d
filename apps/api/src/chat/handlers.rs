use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::chat::engine::{open_chat, respond, ChatReply, ContextPolicy};
use crate::chat::session::ChatSession;
use crate::chat::store;
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::models::chat::ChatMessage;
use crate::state::AppState;
use crate::users::handlers::EmailQuery;
use crate::users::store::require_user;

#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    pub email: String,
    pub chat_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateChatRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CreateChatResponse {
    pub chat_id: Uuid,
    pub chat_name: String,
    pub initial_message: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub email: String,
    pub chat_id: String,
    pub message: String,
    #[serde(default)]
    pub selected_job_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessagesResponse {
    pub chat_id: Uuid,
    pub chat_name: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatHistoryItem {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub chat_name: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ChatHistoryResponse {
    pub chats: Vec<ChatHistoryItem>,
}

/// POST /api/createChat
pub async fn handle_create_chat(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateChatRequest>,
) -> Result<Json<CreateChatResponse>, AppError> {
    let user = require_user(&state.db, &req.email).await?;

    let opened = open_chat(state.llm.as_ref(), &user.profile.0).await;
    let session = ChatSession::start(
        user.id,
        opened.permanent_context,
        opened.greeting.clone(),
        Utc::now(),
    );
    store::insert_session(&state.db, &session).await?;
    info!(chat_id = %session.id, user_id = %user.id, "Chat created");

    Ok(Json(CreateChatResponse {
        chat_id: session.id,
        chat_name: session.chat_name,
        initial_message: opened.greeting,
    }))
}

/// POST /api/sendMessage
pub async fn handle_send_message(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SendMessageRequest>,
) -> Result<Json<ChatReply>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let user = require_user(&state.db, &req.email).await?;
    let chat_id = parse_chat_id(&req.chat_id)?;
    let mut session = store::load_session(&state.db, user.id, chat_id)
        .await?
        .ok_or_else(chat_not_found)?;
    let loaded_at = session.updated_at;
    info!(%chat_id, selected_job_id = ?req.selected_job_id, "Send message request");

    let policy = ContextPolicy::from_config(&state.config);
    let reply = respond(
        state.llm.as_ref(),
        state.jobs.as_ref(),
        &policy,
        &mut session,
        &req.message,
        req.selected_job_id.as_deref(),
    )
    .await?;
    if !store::save_session(&state.db, &session, loaded_at).await? {
        return Err(AppError::Conflict(
            "Chat was updated by another request; please retry".to_string(),
        ));
    }

    Ok(Json(reply))
}

/// GET /api/getChatMessages
pub async fn handle_get_chat_messages(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ChatQuery>,
) -> Result<Json<ChatMessagesResponse>, AppError> {
    info!(email = %params.email, chat_id = %params.chat_id, "Get chat messages request");
    let user = require_user(&state.db, &params.email).await?;
    let chat_id = parse_chat_id(&params.chat_id)?;
    let session = store::load_session(&state.db, user.id, chat_id)
        .await?
        .ok_or_else(chat_not_found)?;

    Ok(Json(ChatMessagesResponse {
        chat_id: session.id,
        chat_name: session.chat_name,
        messages: session.transcript,
    }))
}

/// GET /api/chatHistoryRequest
pub async fn handle_chat_history(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<EmailQuery>,
) -> Result<Json<ChatHistoryResponse>, AppError> {
    info!(email = %params.email, "Chat history request");
    let user = require_user(&state.db, &params.email).await?;
    let chats = store::list_sessions(&state.db, user.id)
        .await?
        .into_iter()
        .map(|row| ChatHistoryItem {
            id: row.id,
            chat_id: row.id,
            chat_name: row.chat_name,
            updated_at: row.updated_at,
        })
        .collect();
    Ok(Json(ChatHistoryResponse { chats }))
}

/// POST /api/deleteChatSession
pub async fn handle_delete_chat(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ChatQuery>,
) -> Result<Json<Value>, AppError> {
    let user = require_user(&state.db, &params.email).await?;
    let chat_id = parse_chat_id(&params.chat_id)?;
    if !store::delete_session(&state.db, user.id, chat_id).await? {
        return Err(chat_not_found());
    }
    info!(%chat_id, "Chat session deleted");
    Ok(Json(json!({"message": "Chat session deleted successfully"})))
}

/// Chat ids that are not UUIDs cannot exist, so they are a 404 like any unknown id.
fn parse_chat_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| chat_not_found())
}

fn chat_not_found() -> AppError {
    AppError::NotFound("Chat not found".to_string())
}
