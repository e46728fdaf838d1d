use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::chat::session::ChatSession;
use crate::models::chat::{ChatListingRow, ChatSessionRow};

pub async fn insert_session(pool: &PgPool, session: &ChatSession) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO chat_sessions
            (id, user_id, chat_name, permanent_context, summary, recent_messages,
             messages, last_jobs, selected_job, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(session.id)
    .bind(session.user_id)
    .bind(&session.chat_name)
    .bind(&session.context.permanent)
    .bind(&session.context.summary)
    .bind(Json(&session.context.recent))
    .bind(Json(&session.transcript))
    .bind(Json(&session.last_jobs))
    .bind(session.selected_job.as_ref().map(Json))
    .bind(session.created_at)
    .bind(session.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Loads a chat owned by `user_id`. Chats of other users are invisible.
pub async fn load_session(
    pool: &PgPool,
    user_id: Uuid,
    chat_id: Uuid,
) -> Result<Option<ChatSession>, sqlx::Error> {
    let row: Option<ChatSessionRow> =
        sqlx::query_as("SELECT * FROM chat_sessions WHERE id = $1 AND user_id = $2")
            .bind(chat_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(ChatSession::from))
}

/// Writes back everything a chat turn may change, provided the row still carries
/// the `updated_at` it was loaded with. Returns false when another write got there first.
pub async fn save_session(
    pool: &PgPool,
    session: &ChatSession,
    loaded_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE chat_sessions
        SET chat_name = $3,
            summary = $4,
            recent_messages = $5,
            messages = $6,
            last_jobs = $7,
            selected_job = $8,
            updated_at = $9
        WHERE id = $1 AND user_id = $2 AND updated_at = $10
        "#,
    )
    .bind(session.id)
    .bind(session.user_id)
    .bind(&session.chat_name)
    .bind(&session.context.summary)
    .bind(Json(&session.context.recent))
    .bind(Json(&session.transcript))
    .bind(Json(&session.last_jobs))
    .bind(session.selected_job.as_ref().map(Json))
    .bind(session.updated_at)
    .bind(loaded_at)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Chats of a user, most recently active first.
pub async fn list_sessions(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<ChatListingRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, chat_name, updated_at FROM chat_sessions WHERE user_id = $1 ORDER BY updated_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Returns whether a chat owned by `user_id` was deleted.
pub async fn delete_session(
    pool: &PgPool,
    user_id: Uuid,
    chat_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM chat_sessions WHERE id = $1 AND user_id = $2")
        .bind(chat_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
