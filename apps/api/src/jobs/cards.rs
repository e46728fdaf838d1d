//! Job cards: the compact projection of a raw JSearch job record that the
//! frontend renders and the chat engine feeds back to the model.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const DESCRIPTION_LIMIT: usize = 500;
const BRIEF_SUMMARY_LIMIT: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCard {
    pub job_id: String,
    pub job_title: String,
    pub employer_name: String,
    pub job_description: String,
    pub job_location: String,
    pub job_salary: Option<String>,
    pub job_employment_type: String,
    pub job_apply_link: String,
    pub job_posted_at: String,
    pub job_is_remote: Option<bool>,
    pub employer_logo: Option<String>,
    pub job_highlights: Option<Value>,
}

impl JobCard {
    /// Projects a raw job object from the JSearch API.
    pub fn from_raw(job: &Value) -> Self {
        let description = text_field(job, "job_description").unwrap_or_default();

        JobCard {
            job_id: text_field(job, "job_id").unwrap_or_default(),
            job_title: text_field(job, "job_title").unwrap_or_else(|| "Unknown Title".to_string()),
            employer_name: text_field(job, "employer_name")
                .unwrap_or_else(|| "Unknown Company".to_string()),
            job_description: truncate_chars(&description, DESCRIPTION_LIMIT),
            job_location: text_field(job, "job_location")
                .or_else(|| text_field(job, "job_city"))
                .unwrap_or_default(),
            job_salary: format_salary(job),
            job_employment_type: text_field(job, "job_employment_type").unwrap_or_default(),
            job_apply_link: text_field(job, "job_apply_link").unwrap_or_default(),
            job_posted_at: text_field(job, "job_posted_at").unwrap_or_default(),
            job_is_remote: job.get("job_is_remote").and_then(Value::as_bool),
            employer_logo: text_field(job, "employer_logo"),
            job_highlights: job.get("job_highlights").filter(|v| !v.is_null()).cloned(),
        }
    }

    /// Compact view sent to the model as a tool result.
    pub fn brief(&self) -> Value {
        json!({
            "job_id": self.job_id,
            "job_title": self.job_title,
            "employer_name": self.employer_name,
            "job_location": self.job_location,
            "job_salary": self.job_salary,
            "job_employment_type": self.job_employment_type,
            "job_is_remote": self.job_is_remote,
            "job_posted_at": self.job_posted_at,
            "summary": truncate_chars(&self.job_description, BRIEF_SUMMARY_LIMIT),
        })
    }

    /// Plain-text rendering used when the user has selected this job.
    pub fn details_text(&self) -> String {
        let mut lines = vec![
            format!("Title: {}", self.job_title),
            format!("Company: {}", self.employer_name),
            format!("Job ID: {}", self.job_id),
        ];
        if !self.job_location.is_empty() {
            lines.push(format!("Location: {}", self.job_location));
        }
        if let Some(salary) = &self.job_salary {
            lines.push(format!("Salary: {salary}"));
        }
        if !self.job_employment_type.is_empty() {
            lines.push(format!("Employment type: {}", self.job_employment_type));
        }
        if let Some(remote) = self.job_is_remote {
            lines.push(format!("Remote: {}", if remote { "yes" } else { "no" }));
        }
        if !self.job_description.is_empty() {
            lines.push(format!("Description: {}", self.job_description));
        }
        if let Some(Value::Object(highlights)) = &self.job_highlights {
            for (section, items) in highlights {
                let items: Vec<&str> = items
                    .as_array()
                    .map(|a| a.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();
                if !items.is_empty() {
                    lines.push(format!("{section}: {}", items.join("; ")));
                }
            }
        }
        lines.join("\n")
    }
}

/// Extracts the job cards from a full JSearch response body.
pub fn cards_from_response(response: &Value) -> Vec<JobCard> {
    response
        .get("data")
        .and_then(Value::as_array)
        .map(|jobs| jobs.iter().map(JobCard::from_raw).collect())
        .unwrap_or_default()
}

/// Non-empty string value of `key`, if any.
fn text_field(job: &Value, key: &str) -> Option<String> {
    job.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn format_salary(job: &Value) -> Option<String> {
    let bound = |key: &str| job.get(key).and_then(Value::as_f64).filter(|v| *v != 0.0);

    if let (Some(min), Some(max)) = (bound("job_min_salary"), bound("job_max_salary")) {
        let period = job
            .get("job_salary_period")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
            .map(str::to_lowercase)
            .unwrap_or_else(|| "yearly".to_string());
        return Some(format!(
            "${} - ${} {period}",
            with_thousands(min),
            with_thousands(max)
        ));
    }

    match job.get("job_salary") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn with_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0 {
        format!("-{out}")
    } else {
        out
    }
}

pub(crate) fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let head: String = text.chars().take(limit).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_job() -> Value {
        json!({
            "job_id": "abc123",
            "job_title": "Backend Engineer",
            "employer_name": "Acme",
            "job_description": "Build APIs.",
            "job_city": "Chicago",
            "job_min_salary": 120000,
            "job_max_salary": 150000.0,
            "job_salary_period": "YEAR",
            "job_employment_type": "FULLTIME",
            "job_apply_link": "https://acme.example/apply",
            "job_posted_at": "2 days ago",
            "job_is_remote": true,
            "employer_logo": null,
            "job_highlights": {"Qualifications": ["Rust", "Postgres"]}
        })
    }

    #[test]
    fn test_salary_range_uses_thousands_separators() {
        let card = JobCard::from_raw(&raw_job());
        assert_eq!(card.job_salary.as_deref(), Some("$120,000 - $150,000 year"));
    }

    #[test]
    fn test_salary_period_defaults_to_yearly() {
        let mut job = raw_job();
        job["job_salary_period"] = Value::Null;
        let card = JobCard::from_raw(&job);
        assert_eq!(card.job_salary.as_deref(), Some("$120,000 - $150,000 yearly"));
    }

    #[test]
    fn test_salary_falls_back_to_raw_string() {
        let job = json!({"job_salary": "Competitive", "job_min_salary": null});
        let card = JobCard::from_raw(&job);
        assert_eq!(card.job_salary.as_deref(), Some("Competitive"));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let card = JobCard::from_raw(&json!({}));
        assert_eq!(card.job_id, "");
        assert_eq!(card.job_title, "Unknown Title");
        assert_eq!(card.employer_name, "Unknown Company");
        assert_eq!(card.job_location, "");
        assert!(card.job_salary.is_none());
        assert!(card.job_highlights.is_none());
    }

    #[test]
    fn test_location_prefers_job_location_over_city() {
        let mut job = raw_job();
        job["job_location"] = json!("Chicago, IL");
        assert_eq!(JobCard::from_raw(&job).job_location, "Chicago, IL");
        assert_eq!(JobCard::from_raw(&raw_job()).job_location, "Chicago");
    }

    #[test]
    fn test_long_description_truncated_to_500_chars() {
        let mut job = raw_job();
        job["job_description"] = json!("x".repeat(600));
        let card = JobCard::from_raw(&job);
        assert_eq!(card.job_description.chars().count(), 503);
        assert!(card.job_description.ends_with("..."));
    }

    #[test]
    fn test_cards_from_response_handles_missing_data() {
        assert!(cards_from_response(&json!({"status": "OK"})).is_empty());
        let cards = cards_from_response(&json!({"data": [raw_job(), raw_job()]}));
        assert_eq!(cards.len(), 2);
    }

    #[test]
    fn test_details_text_includes_highlights() {
        let text = JobCard::from_raw(&raw_job()).details_text();
        assert!(text.contains("Title: Backend Engineer"));
        assert!(text.contains("Qualifications: Rust; Postgres"));
        assert!(text.contains("Remote: yes"));
    }

    #[test]
    fn test_with_thousands() {
        assert_eq!(with_thousands(999.0), "999");
        assert_eq!(with_thousands(1000.0), "1,000");
        assert_eq!(with_thousands(1234567.4), "1,234,567");
    }
}
