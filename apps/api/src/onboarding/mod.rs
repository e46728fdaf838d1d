// Onboarding: PDF résumé → text → profile preview → confirmed user document.

pub mod extractor;
pub mod handlers;
pub mod prompts;
pub mod resume_parser;
