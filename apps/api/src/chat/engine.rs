//! Chat engine: opens chats and answers messages.
//!
//! Per turn:
//! 1. resolve a newly selected job (shown cards first, then the job-search API)
//! 2. build the system prompt from the context layers
//! 3. tool loop: the model either answers directly or calls `search_jobs`
//! 4. record the exchange; anything evicted from the window is folded into the summary
//!
//! The engine mutates a `ChatSession` in memory. Persisting it is the caller's job.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::chat::context::{digest, transcript_text, ChatContext};
use crate::chat::prompts::{
    build_system_prompt, fallback_greeting, render_profile, NO_REPLY_FALLBACK, OPENING_PROMPT,
    SUMMARY_PROMPT, SUMMARY_SYSTEM,
};
use crate::chat::session::ChatSession;
use crate::chat::tools::{search_jobs_tool, SearchJobsArgs, SEARCH_JOBS_TOOL};
use crate::config::Config;
use crate::errors::AppError;
use crate::jobs::cards::JobCard;
use crate::jobs::jsearch::JobSearch;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{complete_json, ChatModel, Role, Turn, TurnBlock};
use crate::models::chat::ChatMessage;
use crate::models::user::UserProfile;

/// Tool-calling rounds allowed per user message.
pub const MAX_TOOL_ROUNDS: usize = 3;

/// Knobs of the context manager.
#[derive(Debug, Clone)]
pub struct ContextPolicy {
    /// Messages kept verbatim in the recent window.
    pub recent_window: usize,
    /// Cards kept from one search.
    pub max_job_cards: usize,
    /// Country used when the model does not name one.
    pub country: String,
}

impl Default for ContextPolicy {
    fn default() -> Self {
        Self {
            recent_window: 10,
            max_job_cards: 10,
            country: "us".to_string(),
        }
    }
}

impl ContextPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            recent_window: config.chat_recent_window,
            max_job_cards: config.chat_max_job_cards.max(1),
            country: config.jsearch_country.clone(),
        }
    }
}

/// Permanent context and greeting of a new chat.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenedChat {
    pub permanent_context: String,
    pub greeting: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OpeningJson {
    context: String,
    greeting: String,
}

/// Response of one chat turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub message: String,
    pub jobs: Option<Vec<JobCard>>,
    pub selected_job_details: Option<JobCard>,
}

struct TurnOutcome {
    text: String,
    jobs: Option<Vec<JobCard>>,
}

/// Writes the permanent context and greeting for a new chat in one structured
/// call. Falls back to a plain rendering of the profile when the call fails.
pub async fn open_chat(model: &dyn ChatModel, profile: &UserProfile) -> OpenedChat {
    let rendered = render_profile(profile);
    let prompt = OPENING_PROMPT.replace("{profile}", &rendered);

    let opening = match complete_json::<OpeningJson>(model, &prompt, JSON_ONLY_SYSTEM).await {
        Ok(opening) => opening,
        Err(e) => {
            warn!("Permanent context generation failed, using profile rendering: {e}");
            OpeningJson::default()
        }
    };

    let permanent_context = match opening.context.trim() {
        "" => rendered,
        brief => brief.to_string(),
    };
    let greeting = match opening.greeting.trim() {
        "" => fallback_greeting(profile),
        greeting => greeting.to_string(),
    };

    OpenedChat {
        permanent_context,
        greeting,
    }
}

/// Answers one user message and updates `session` in place.
pub async fn respond(
    model: &dyn ChatModel,
    jobs: &dyn JobSearch,
    policy: &ContextPolicy,
    session: &mut ChatSession,
    user_message: &str,
    selected_job_id: Option<&str>,
) -> Result<ChatReply, AppError> {
    let user_message = user_message.trim();
    if user_message.is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let mut selected_job_details = None;
    if let Some(job_id) = selected_job_id.map(str::trim).filter(|id| !id.is_empty()) {
        match resolve_job(jobs, policy, session, job_id).await {
            Some(card) => {
                session.selected_job = Some(card.clone());
                selected_job_details = Some(card);
            }
            None => warn!(job_id, "Selected job could not be resolved"),
        }
    }

    let system = build_system_prompt(
        &session.context,
        session.selected_job.as_ref(),
        &session.last_jobs,
    );
    let turns = session.context.turns_with(user_message);
    let outcome = run_tool_loop(model, jobs, policy, &system, turns).await?;

    let now = Utc::now();
    let user_entry = ChatMessage::user(user_message, now);
    let bot_entry = ChatMessage::bot(outcome.text.clone(), now);
    session.transcript.push(user_entry.clone());
    session
        .transcript
        .push(bot_entry.clone().with_jobs(outcome.jobs.clone()));
    if let Some(found) = &outcome.jobs {
        session.last_jobs = found.clone();
    }

    let evicted = session
        .context
        .record([user_entry, bot_entry], policy.recent_window);
    if !evicted.is_empty() {
        debug!(evicted = evicted.len(), "Folding evicted messages into summary");
        fold_into_summary(model, &mut session.context, &evicted).await;
    }

    session.name_from(user_message);
    session.updated_at = now;

    Ok(ChatReply {
        message: outcome.text,
        jobs: outcome.jobs,
        selected_job_details,
    })
}

async fn resolve_job(
    jobs: &dyn JobSearch,
    policy: &ContextPolicy,
    session: &ChatSession,
    job_id: &str,
) -> Option<JobCard> {
    if let Some(card) = session.find_card(job_id) {
        return Some(card);
    }
    match jobs.job_details(job_id, &policy.country).await {
        Ok(card) => card,
        Err(e) => {
            warn!(job_id, "Job details lookup failed: {e}");
            None
        }
    }
}

async fn run_tool_loop(
    model: &dyn ChatModel,
    jobs: &dyn JobSearch,
    policy: &ContextPolicy,
    system: &str,
    mut turns: Vec<Turn>,
) -> Result<TurnOutcome, AppError> {
    let tools = [search_jobs_tool()];
    let mut found: Option<Vec<JobCard>> = None;
    let mut interim_text: Option<String> = None;

    for round in 0..MAX_TOOL_ROUNDS {
        let response = model.converse(system, &turns, &tools).await?;
        let text = response
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let calls = response.tool_calls();

        if calls.is_empty() {
            return Ok(TurnOutcome {
                text: text
                    .or(interim_text)
                    .unwrap_or_else(|| NO_REPLY_FALLBACK.to_string()),
                jobs: found,
            });
        }

        debug!(round, calls = calls.len(), "Model requested tools");
        interim_text = text.or(interim_text);
        turns.push(response.to_turn());

        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let (content, is_error) = match call.name.as_str() {
                SEARCH_JOBS_TOOL => match run_search(jobs, policy, call.input).await {
                    Ok(cards) => {
                        let content = search_result_content(&cards);
                        if !cards.is_empty() {
                            found = Some(cards);
                        }
                        (content, false)
                    }
                    Err(message) => (message, true),
                },
                other => (format!("Unknown tool: {other}"), true),
            };
            results.push(TurnBlock::ToolResult {
                tool_use_id: call.id,
                content,
                is_error,
            });
        }
        turns.push(Turn {
            role: Role::User,
            content: results,
        });
    }

    warn!("Tool round limit reached without a final answer");
    Ok(TurnOutcome {
        text: interim_text.unwrap_or_else(|| NO_REPLY_FALLBACK.to_string()),
        jobs: found,
    })
}

/// Runs one `search_jobs` call. Errors come back as text for the model.
async fn run_search(
    jobs: &dyn JobSearch,
    policy: &ContextPolicy,
    input: Value,
) -> Result<Vec<JobCard>, String> {
    let args: SearchJobsArgs = serde_json::from_value(input)
        .map_err(|e| format!("Invalid search_jobs arguments: {e}"))?;
    if args.query.trim().is_empty() {
        return Err("search_jobs requires a non-empty query".to_string());
    }

    let query = args.into_query(&policy.country);
    info!(query = %query.query, remote = query.work_from_home, "Running job search for chat");

    let mut cards = jobs.search(&query).await.map_err(|e| {
        warn!("Job search failed: {e}");
        format!("Job search failed: {e}")
    })?;
    cards.truncate(policy.max_job_cards);
    Ok(cards)
}

fn search_result_content(cards: &[JobCard]) -> String {
    if cards.is_empty() {
        return "No jobs matched this search. Suggest broadening the query or changing filters."
            .to_string();
    }
    Value::Array(cards.iter().map(JobCard::brief).collect()).to_string()
}

/// Merges `evicted` into the rolling summary. A failed summary call appends a
/// plain digest instead, so evicted messages are never lost outright.
async fn fold_into_summary(
    model: &dyn ChatModel,
    context: &mut ChatContext,
    evicted: &[ChatMessage],
) {
    let previous = context.summary.as_deref().unwrap_or("(none)");
    let prompt = SUMMARY_PROMPT
        .replace("{previous_summary}", previous)
        .replace("{messages}", &transcript_text(evicted));

    match model.complete(&prompt, SUMMARY_SYSTEM).await {
        Ok(summary) if !summary.trim().is_empty() => context.set_summary(&summary),
        outcome => {
            if let Err(e) = outcome {
                warn!("Summary generation failed, appending digest: {e}");
            }
            let merged = match context.summary.as_deref() {
                Some(existing) => format!("{existing}\n{}", digest(evicted)),
                None => digest(evicted),
            };
            context.set_summary(&merged);
        }
    }
}
