// Chat LLM prompt templates and the per-turn system prompt builder.

use crate::chat::context::ChatContext;
use crate::jobs::cards::JobCard;
use crate::models::user::UserProfile;

pub const CHAT_PERSONA_SYSTEM: &str = "\
You are Jobmate, a friendly and practical job-search assistant. \
You help the user find jobs, understand postings, tailor their résumé, prepare for interviews \
and think through career decisions.

RULES:
1. Call the `search_jobs` tool when the user asks to find, search or show jobs, or changes \
their search criteria. Build the query from their request plus what you know about them \
(role, skills, location, remote preference).
2. Do NOT call `search_jobs` for advice, résumé tips, interview preparation or questions \
about jobs already shown.
3. Never invent job listings, companies, salaries or links. Only discuss jobs returned by \
`search_jobs` or listed below.
4. When referring to shown jobs, use their number and title.
5. Ground advice in the user's profile. Keep answers concise and skimmable.";

pub const OPENING_PROMPT: &str = r#"You are preparing a job-search chat for the user described below.

USER PROFILE:
{profile}

Return a JSON object with exactly these fields:
{
  "context": "A compact third-person brief of the user (at most 200 words): target roles, seniority, years of experience, strongest skills, education, location, notable achievements.",
  "greeting": "A warm two-sentence greeting addressed to the user by first name that mentions one relevant strength and offers to search for jobs or help with applications."
}

Return ONLY the JSON object."#;

pub const SUMMARY_SYSTEM: &str = "\
You maintain the running memory of a job-search conversation. \
Write plain text, no markdown headings. Preserve the user's stated preferences \
(roles, locations, salary, remote, company size, industries), decisions, jobs they showed \
interest in (title, company, job id) and open questions. Drop pleasantries.";

pub const SUMMARY_PROMPT: &str = r#"PREVIOUS SUMMARY:
{previous_summary}

MESSAGES LEAVING SHORT-TERM MEMORY:
{messages}

Write the updated summary (at most 250 words) that merges the previous summary with these messages."#;

pub const NO_REPLY_FALLBACK: &str =
    "Sorry, I couldn't put together a response just now. Could you rephrase or try again?";

/// Deterministic plain-text rendering of a profile. Feeds the opening prompt
/// and stands in for the permanent context when that call fails.
pub fn render_profile(profile: &UserProfile) -> String {
    let mut lines = Vec::new();
    let mut push = |label: &str, value: &str| {
        if !value.trim().is_empty() {
            lines.push(format!("{label}: {}", value.trim()));
        }
    };

    push("Name", &profile.name);
    push("Location", &profile.location);
    push("Summary", &profile.profile_summary);
    push("Skills", &profile.skills.join(", "));
    push("Experience", &profile.experience.join(" | "));
    if let Some(education) = &profile.education {
        push("Education", &education.join(" | "));
    }
    if let Some(certs) = &profile.certifications {
        push("Certifications & awards", &certs.join(" | "));
    }
    if let Some(projects) = &profile.projects {
        push("Projects", &projects.join(" | "));
    }
    if let Some(about) = &profile.about {
        push("About", about);
    }
    lines.join("\n")
}

pub fn fallback_greeting(profile: &UserProfile) -> String {
    let first_name = profile.name.split_whitespace().next().unwrap_or_default();
    let salutation = if first_name.is_empty() {
        "Hi there!".to_string()
    } else {
        format!("Hi {first_name}!")
    };
    format!(
        "{salutation} I'm your job-search assistant. I can search for openings that match your \
         profile, explain postings, and help with your résumé and interviews. What are you looking for?"
    )
}

/// System prompt for one chat turn: persona, permanent context, rolling
/// summary, selected job and the most recently shown jobs.
pub fn build_system_prompt(
    context: &ChatContext,
    selected_job: Option<&JobCard>,
    last_jobs: &[JobCard],
) -> String {
    let mut sections = vec![
        CHAT_PERSONA_SYSTEM.to_string(),
        format!("ABOUT THE USER:\n{}", context.permanent.trim()),
    ];

    if let Some(summary) = context.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        sections.push(format!("EARLIER IN THIS CONVERSATION:\n{}", summary.trim()));
    }

    if let Some(job) = selected_job {
        sections.push(format!(
            "JOB THE USER SELECTED (answer follow-up questions about it):\n{}",
            job.details_text()
        ));
    }

    if !last_jobs.is_empty() {
        let listing = last_jobs
            .iter()
            .enumerate()
            .map(|(i, job)| {
                let location = if job.job_location.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", job.job_location)
                };
                format!(
                    "{}. {} at {}{} [job_id: {}]",
                    i + 1,
                    job.job_title,
                    job.employer_name,
                    location,
                    job.job_id
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("JOBS MOST RECENTLY SHOWN TO THE USER:\n{listing}"));
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile() -> UserProfile {
        UserProfile {
            name: "Alex Johnson".to_string(),
            email: "alex@example.com".to_string(),
            location: "San Francisco, CA".to_string(),
            skills: vec!["Python".to_string(), "React".to_string()],
            education: Some(vec!["M.S. CS, Stanford".to_string()]),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_profile_skips_empty_fields() {
        let text = render_profile(&profile());
        assert!(text.contains("Name: Alex Johnson"));
        assert!(text.contains("Skills: Python, React"));
        assert!(text.contains("Education: M.S. CS, Stanford"));
        assert!(!text.contains("Experience:"));
        assert!(!text.contains("alex@example.com"));
    }

    #[test]
    fn test_fallback_greeting_uses_first_name() {
        assert!(fallback_greeting(&profile()).starts_with("Hi Alex!"));
        assert!(fallback_greeting(&UserProfile::default()).starts_with("Hi there!"));
    }

    #[test]
    fn test_system_prompt_includes_only_present_layers() {
        let ctx = ChatContext::new("Senior full-stack developer.");
        let prompt = build_system_prompt(&ctx, None, &[]);
        assert!(prompt.contains("ABOUT THE USER:\nSenior full-stack developer."));
        assert!(!prompt.contains("EARLIER IN THIS CONVERSATION"));
        assert!(!prompt.contains("JOB THE USER SELECTED"));
        assert!(!prompt.contains("JOBS MOST RECENTLY SHOWN"));
    }

    #[test]
    fn test_system_prompt_numbers_recent_jobs_and_shows_selection() {
        let mut ctx = ChatContext::new("brief");
        ctx.set_summary("Prefers remote roles around $180k.");
        let jobs = vec![
            JobCard::from_raw(&json!({"job_id": "a1", "job_title": "Backend Engineer", "employer_name": "Acme", "job_location": "Remote"})),
            JobCard::from_raw(&json!({"job_id": "b2", "job_title": "Data Scientist", "employer_name": "Globex"})),
        ];
        let prompt = build_system_prompt(&ctx, Some(&jobs[0]), &jobs);

        assert!(prompt.contains("Prefers remote roles around $180k."));
        assert!(prompt.contains("1. Backend Engineer at Acme (Remote) [job_id: a1]"));
        assert!(prompt.contains("2. Data Scientist at Globex [job_id: b2]"));
        assert!(prompt.contains("JOB THE USER SELECTED"));
        assert!(prompt.contains("Title: Backend Engineer"));
    }
}
