//! Bounded conversation state for one chat.
//!
//! Three layers reach the model on every turn:
//! 1. permanent context: profile brief written when the chat was created, never evicted
//! 2. rolling summary: everything that has left the recent window
//! 3. recent window: the last N messages, always starting with a user message
//!
//! `record` is the only way messages enter the window. It hands back whatever it
//! evicted so the caller can fold it into the summary.

use crate::jobs::cards::truncate_chars;
use crate::llm_client::{Role, Turn, TurnBlock};
use crate::models::chat::{ChatMessage, Sender};

/// Upper bound on the rolling summary; the oldest text goes first.
pub const MAX_SUMMARY_CHARS: usize = 4000;
/// Smallest window `Config` accepts: one user message and its reply.
pub const MIN_RECENT_WINDOW: usize = 2;

const DIGEST_LINE_CHARS: usize = 200;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatContext {
    pub permanent: String,
    pub summary: Option<String>,
    pub recent: Vec<ChatMessage>,
}

impl ChatContext {
    pub fn new(permanent: impl Into<String>) -> Self {
        Self {
            permanent: permanent.into(),
            summary: None,
            recent: Vec::new(),
        }
    }

    /// Appends `messages` and evicts from the front until at most `window`
    /// messages remain and the window starts with a user message.
    /// Returns the evicted messages, oldest first.
    pub fn record(
        &mut self,
        messages: impl IntoIterator<Item = ChatMessage>,
        window: usize,
    ) -> Vec<ChatMessage> {
        self.recent.extend(messages);

        let mut cut = self.recent.len().saturating_sub(window);
        while cut < self.recent.len() && self.recent[cut].sender != Sender::User {
            cut += 1;
        }
        self.recent.drain(..cut).collect()
    }

    /// Replaces the summary, keeping only its most recent `MAX_SUMMARY_CHARS`.
    pub fn set_summary(&mut self, summary: &str) {
        let summary = summary.trim();
        self.summary = if summary.is_empty() {
            None
        } else {
            Some(keep_tail(summary, MAX_SUMMARY_CHARS))
        };
    }

    /// Model turns for the recent window followed by `user_message`.
    /// Leading assistant messages are dropped and consecutive messages from
    /// the same side are merged, so roles alternate starting with the user.
    pub fn turns_with(&self, user_message: &str) -> Vec<Turn> {
        let mut turns: Vec<Turn> = Vec::with_capacity(self.recent.len() + 1);
        let pending = self
            .recent
            .iter()
            .map(|m| (role_of(m.sender), m.message.as_str()))
            .chain(std::iter::once((Role::User, user_message)));

        for (role, text) in pending {
            if text.trim().is_empty() || (turns.is_empty() && role == Role::Assistant) {
                continue;
            }
            let block = TurnBlock::Text {
                text: text.to_string(),
            };
            match turns.last_mut() {
                Some(last) if last.role == role => last.content.push(block),
                _ => turns.push(Turn {
                    role,
                    content: vec![block],
                }),
            }
        }
        turns
    }
}

/// Deterministic stand-in for a model-written summary of `evicted`.
pub fn digest(evicted: &[ChatMessage]) -> String {
    evicted
        .iter()
        .map(|m| {
            let who = match m.sender {
                Sender::User => "User",
                Sender::Bot => "Assistant",
            };
            format!("{who}: {}", truncate_chars(m.message.trim(), DIGEST_LINE_CHARS))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders messages as a plain transcript for summarization prompts.
pub fn transcript_text(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| match m.sender {
            Sender::User => format!("User: {}", m.message.trim()),
            Sender::Bot => format!("Assistant: {}", m.message.trim()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn role_of(sender: Sender) -> Role {
    match sender {
        Sender::User => Role::User,
        Sender::Bot => Role::Assistant,
    }
}

fn keep_tail(text: &str, limit: usize) -> String {
    let count = text.chars().count();
    if count <= limit {
        return text.to_string();
    }
    text.chars().skip(count - limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn exchange(n: usize) -> [ChatMessage; 2] {
        let now = Utc::now();
        [
            ChatMessage::user(format!("question {n}"), now),
            ChatMessage::bot(format!("answer {n}"), now),
        ]
    }

    #[test]
    fn test_record_within_window_evicts_nothing() {
        let mut ctx = ChatContext::new("profile");
        for n in 0..5 {
            assert!(ctx.record(exchange(n), 10).is_empty());
        }
        assert_eq!(ctx.recent.len(), 10);
    }

    #[test]
    fn test_record_evicts_oldest_exchange_when_full() {
        let mut ctx = ChatContext::new("profile");
        for n in 0..5 {
            ctx.record(exchange(n), 10);
        }
        let evicted = ctx.record(exchange(5), 10);

        assert_eq!(evicted.len(), 2);
        assert_eq!(evicted[0].message, "question 0");
        assert_eq!(evicted[1].message, "answer 0");
        assert_eq!(ctx.recent.len(), 10);
        assert_eq!(ctx.recent[0].message, "question 1");
    }

    #[test]
    fn test_odd_window_still_starts_with_user() {
        let mut ctx = ChatContext::new("profile");
        for n in 0..4 {
            ctx.record(exchange(n), 5);
        }
        assert!(ctx.recent.len() <= 5);
        assert_eq!(ctx.recent[0].sender, Sender::User);
    }

    #[test]
    fn test_leading_bot_message_is_evicted() {
        let mut ctx = ChatContext::new("profile");
        ctx.recent.push(ChatMessage::bot("orphan", Utc::now()));
        let evicted = ctx.record(exchange(0), 10);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].message, "orphan");
        assert_eq!(ctx.recent[0].sender, Sender::User);
    }

    #[test]
    fn test_record_never_exceeds_given_window() {
        let mut ctx = ChatContext::new("profile");
        let mut evicted = 0;
        for n in 0..3 {
            evicted += ctx.record(exchange(n), 1).len();
            assert!(ctx.recent.len() <= 1);
        }
        assert_eq!(evicted + ctx.recent.len(), 6);
    }

    #[test]
    fn test_turns_alternate_and_end_with_new_message() {
        let mut ctx = ChatContext::new("profile");
        ctx.record(exchange(0), 10);
        let turns = ctx.turns_with("question 1");

        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[2].role, Role::User);
        assert_eq!(
            turns[2].content,
            vec![TurnBlock::Text {
                text: "question 1".to_string()
            }]
        );
    }

    #[test]
    fn test_turns_merge_consecutive_same_role() {
        let now = Utc::now();
        let ctx = ChatContext {
            permanent: String::new(),
            summary: None,
            recent: vec![
                ChatMessage::bot("greeting", now),
                ChatMessage::user("first", now),
            ],
        };
        let turns = ctx.turns_with("second");

        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content.len(), 2);
    }

    #[test]
    fn test_summary_is_capped_keeping_newest_text() {
        let mut ctx = ChatContext::new("profile");
        let long = format!("{}{}", "a".repeat(MAX_SUMMARY_CHARS), "tail");
        ctx.set_summary(&long);

        let summary = ctx.summary.unwrap();
        assert_eq!(summary.chars().count(), MAX_SUMMARY_CHARS);
        assert!(summary.ends_with("tail"));
    }

    #[test]
    fn test_blank_summary_clears() {
        let mut ctx = ChatContext::new("profile");
        ctx.set_summary("   ");
        assert!(ctx.summary.is_none());
    }

    #[test]
    fn test_digest_labels_speakers() {
        let text = digest(&exchange(3));
        assert_eq!(text, "User: question 3\nAssistant: answer 3");
    }
}
