use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// The user profile document. Produced by résumé extraction, confirmed by the
/// user, then stored keyed by email.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub experience: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub profile_summary: String,
    pub education: Option<Vec<String>>,
    #[serde(rename = "certificationsAndAchievementsAndAwards")]
    pub certifications: Option<Vec<String>>,
    pub projects: Option<Vec<String>>,
    pub about: Option<String>,
    /// S3 key of the archived résumé PDF, when one was uploaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_key: Option<String>,
}

/// Profile fields a user may change after onboarding. Email is the document key
/// and is deliberately absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<String>>,
    #[serde(
        rename = "certificationsAndAchievementsAndAwards",
        skip_serializing_if = "Option::is_none"
    )]
    pub certifications: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
}

impl ProfileFields {
    /// JSON object containing only the fields that were provided.
    pub fn to_patch(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Default::default()))
    }

    pub fn is_empty(&self) -> bool {
        self.to_patch().as_object().map_or(true, |o| o.is_empty())
    }
}

/// A job the user saved or applied to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRef {
    pub job_id: String,
    pub job_title: String,
    pub company_name: String,
    pub job_link: String,
}

/// The two job lists kept on a user document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobList {
    Saved,
    Applied,
}

impl JobList {
    pub fn column(self) -> &'static str {
        match self {
            JobList::Saved => "saved_jobs",
            JobList::Applied => "applied_jobs",
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub profile: Json<UserProfile>,
    pub saved_jobs: Json<Vec<JobRef>>,
    pub applied_jobs: Json<Vec<JobRef>>,
}

impl UserRow {
    pub fn jobs(&self, list: JobList) -> &[JobRef] {
        match list {
            JobList::Saved => &self.saved_jobs.0,
            JobList::Applied => &self.applied_jobs.0,
        }
    }
}

/// Emails are document keys; compare them trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_tolerates_nulls_and_missing_fields() {
        let profile: UserProfile = serde_json::from_value(json!({
            "name": "Alex Johnson",
            "email": "alex@example.com",
            "phone": null,
            "skills": ["Rust"],
            "certificationsAndAchievementsAndAwards": ["AWS SA Pro"]
        }))
        .unwrap();

        assert_eq!(profile.phone, "");
        assert_eq!(profile.location, "");
        assert!(profile.experience.is_empty());
        assert_eq!(
            profile.certifications,
            Some(vec!["AWS SA Pro".to_string()])
        );
        assert!(profile.education.is_none());
    }

    #[test]
    fn test_profile_serializes_frontend_field_names() {
        let profile = UserProfile {
            certifications: Some(vec![]),
            ..Default::default()
        };
        let value = serde_json::to_value(&profile).unwrap();
        assert!(value.get("certificationsAndAchievementsAndAwards").is_some());
        assert!(value.get("resume_key").is_none());
    }

    #[test]
    fn test_profile_fields_patch_contains_only_provided_fields() {
        let fields: ProfileFields = serde_json::from_value(json!({
            "about": "Updated about section",
            "skills": ["Go"]
        }))
        .unwrap();

        assert!(!fields.is_empty());
        let patch = fields.to_patch();
        let keys: Vec<&String> = patch.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(patch["about"], "Updated about section");
    }

    #[test]
    fn test_profile_fields_empty() {
        assert!(ProfileFields::default().is_empty());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alex@Example.COM "), "alex@example.com");
    }
}
