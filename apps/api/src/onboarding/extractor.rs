use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::{complete_json, ChatModel};
use crate::models::user::UserProfile;
use crate::onboarding::prompts::PROFILE_EXTRACTION_PROMPT;

/// Turns résumé text into a profile preview for the user to confirm.
pub async fn extract_profile(
    model: &dyn ChatModel,
    resume_text: &str,
) -> Result<UserProfile, AppError> {
    let prompt = PROFILE_EXTRACTION_PROMPT.replace("{resume_text}", resume_text);
    let system = format!("{JSON_ONLY_SYSTEM} {NO_FABRICATION_INSTRUCTION}");

    let profile: UserProfile = complete_json(model, &prompt, &system).await?;
    let profile = tidy_profile(profile);
    info!(
        skills = profile.skills.len(),
        experience = profile.experience.len(),
        "Extracted profile from résumé"
    );
    Ok(profile)
}

/// Trims text fields, drops blank list entries and empty optional lists.
fn tidy_profile(mut profile: UserProfile) -> UserProfile {
    for field in [
        &mut profile.name,
        &mut profile.email,
        &mut profile.phone,
        &mut profile.location,
        &mut profile.profile_summary,
    ] {
        *field = field.trim().to_string();
    }
    profile.skills = tidy_list(profile.skills);
    profile.experience = tidy_list(profile.experience);
    profile.education = profile.education.map(tidy_list).filter(|l| !l.is_empty());
    profile.certifications = profile.certifications.map(tidy_list).filter(|l| !l.is_empty());
    profile.projects = profile.projects.map(tidy_list).filter(|l| !l.is_empty());
    profile.about = profile
        .about
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty());
    profile.resume_key = None;
    profile
}

fn tidy_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
