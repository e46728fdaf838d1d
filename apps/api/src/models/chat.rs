use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::jobs::cards::JobCard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One message of a chat, as stored and as returned to the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Job cards shown alongside a bot message, when a search ran for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<Vec<JobCard>>,
}

impl ChatMessage {
    pub fn user(message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender: Sender::User,
            message: message.into(),
            timestamp,
            jobs: None,
        }
    }

    pub fn bot(message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender: Sender::Bot,
            message: message.into(),
            timestamp,
            jobs: None,
        }
    }

    pub fn with_jobs(mut self, jobs: Option<Vec<JobCard>>) -> Self {
        self.jobs = jobs;
        self
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ChatSessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub chat_name: String,
    pub permanent_context: String,
    pub summary: Option<String>,
    pub recent_messages: Json<Vec<ChatMessage>>,
    pub messages: Json<Vec<ChatMessage>>,
    pub last_jobs: Json<Vec<JobCard>>,
    pub selected_job: Option<Json<JobCard>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing row for the chat history page.
#[derive(Debug, Clone, FromRow)]
pub struct ChatListingRow {
    pub id: Uuid,
    pub chat_name: String,
    pub updated_at: DateTime<Utc>,
}
