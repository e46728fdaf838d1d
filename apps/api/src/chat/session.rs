use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::chat::context::ChatContext;
use crate::jobs::cards::JobCard;
use crate::models::chat::{ChatMessage, ChatSessionRow};

pub const DEFAULT_CHAT_NAME: &str = "New Chat";
const CHAT_NAME_CHARS: usize = 40;

/// A chat session as the engine sees it.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub chat_name: String,
    pub context: ChatContext,
    /// Every message of the chat, for display. Never sent to the model.
    pub transcript: Vec<ChatMessage>,
    /// Cards of the most recent search, in the order they were shown.
    pub last_jobs: Vec<JobCard>,
    /// The job the user is currently asking about.
    pub selected_job: Option<JobCard>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// A fresh chat whose transcript opens with `greeting`.
    /// The greeting stays out of the recent window.
    pub fn start(
        user_id: Uuid,
        permanent_context: String,
        greeting: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            chat_name: DEFAULT_CHAT_NAME.to_string(),
            context: ChatContext::new(permanent_context),
            transcript: vec![ChatMessage::bot(greeting, now)],
            last_jobs: Vec::new(),
            selected_job: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Looks for a card the user has already been shown: latest search first,
    /// then older searches in the transcript, newest first.
    pub fn find_card(&self, job_id: &str) -> Option<JobCard> {
        self.last_jobs
            .iter()
            .chain(
                self.transcript
                    .iter()
                    .rev()
                    .filter_map(|m| m.jobs.as_ref())
                    .flatten(),
            )
            .find(|c| c.job_id == job_id)
            .cloned()
    }

    /// Names an unnamed chat after the user's first message.
    pub fn name_from(&mut self, first_message: &str) {
        if self.chat_name == DEFAULT_CHAT_NAME {
            let name = chat_name_from(first_message);
            if !name.is_empty() {
                self.chat_name = name;
            }
        }
    }
}

impl From<ChatSessionRow> for ChatSession {
    fn from(row: ChatSessionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            chat_name: row.chat_name,
            context: ChatContext {
                permanent: row.permanent_context,
                summary: row.summary,
                recent: row.recent_messages.0,
            },
            transcript: row.messages.0,
            last_jobs: row.last_jobs.0,
            selected_job: row.selected_job.map(|j| j.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// First line of `message`, cut at a word boundary to fit a chat title.
pub fn chat_name_from(message: &str) -> String {
    let line = message
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();
    let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= CHAT_NAME_CHARS {
        return collapsed;
    }

    let head: String = collapsed.chars().take(CHAT_NAME_CHARS).collect();
    let at_boundary = collapsed.chars().nth(CHAT_NAME_CHARS) == Some(' ');
    let cut = match head.rfind(' ') {
        Some(idx) if idx > 0 && !at_boundary => head[..idx].to_string(),
        _ => head,
    };
    format!("{}…", cut.trim_end_matches(|c: char| c.is_ascii_punctuation()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn card(id: &str) -> JobCard {
        JobCard::from_raw(&json!({"job_id": id, "job_title": format!("Job {id}")}))
    }

    #[test]
    fn test_start_puts_greeting_in_transcript_only() {
        let session = ChatSession::start(
            Uuid::new_v4(),
            "brief".to_string(),
            "Hi Alex!".to_string(),
            Utc::now(),
        );
        assert_eq!(session.chat_name, DEFAULT_CHAT_NAME);
        assert_eq!(session.transcript.len(), 1);
        assert!(session.context.recent.is_empty());
    }

    #[test]
    fn test_find_card_prefers_last_jobs_then_transcript() {
        let mut session =
            ChatSession::start(Uuid::new_v4(), String::new(), String::new(), Utc::now());
        session.transcript.push(
            ChatMessage::bot("older results", Utc::now()).with_jobs(Some(vec![card("old")])),
        );
        session.last_jobs = vec![card("new")];

        assert_eq!(session.find_card("new").unwrap().job_id, "new");
        assert_eq!(session.find_card("old").unwrap().job_id, "old");
        assert!(session.find_card("missing").is_none());
    }

    #[test]
    fn test_short_message_becomes_name_verbatim() {
        assert_eq!(chat_name_from("  Find me Rust jobs  "), "Find me Rust jobs");
    }

    #[test]
    fn test_long_message_cut_at_word_boundary() {
        let name = chat_name_from(
            "Hi! I'm looking for software engineering jobs. Can you help me find some?",
        );
        assert!(name.ends_with('…'));
        assert!(name.chars().count() <= CHAT_NAME_CHARS + 1);
        assert_eq!(name, "Hi! I'm looking for software engineering…");
    }

    #[test]
    fn test_name_from_only_renames_default_chats() {
        let mut session =
            ChatSession::start(Uuid::new_v4(), String::new(), String::new(), Utc::now());
        session.name_from("Remote Python roles");
        session.name_from("Something else");
        assert_eq!(session.chat_name, "Remote Python roles");
    }
}
