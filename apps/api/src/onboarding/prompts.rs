// Onboarding LLM prompt templates

pub const PROFILE_EXTRACTION_PROMPT: &str = r#"Extract the candidate's details from the résumé text below.

RÉSUMÉ TEXT:
{resume_text}

Return a JSON object matching this schema:
{
  "name": "string (required)",
  "email": "string (required, empty string if absent)",
  "phone": "string (required, empty string if absent)",
  "location": "string (required, city and region if present)",
  "skills": ["string (required) one skill per item"],
  "experience": ["string (required) one role per item: title, company, dates, key achievements"],
  "profile_summary": "string (required) two or three sentences",
  "education": ["string (optional) one degree per item"],
  "certificationsAndAchievementsAndAwards": ["string (optional)"],
  "projects": ["string (optional) one project per item"],
  "about": "string (optional)"
}

Omit optional fields that the résumé does not support. Return ONLY the JSON object."#;
