use std::str::FromStr;

use anyhow::{ensure, Context, Result};

use crate::chat::context::MIN_RECENT_WINDOW;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    /// RapidAPI key for JSearch. Searches fail with a "not configured" error when absent.
    pub rapidapi_key: Option<String>,
    pub jsearch_country: String,
    pub chat_recent_window: usize,
    pub chat_max_job_cards: usize,
    pub job_cache_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            rapidapi_key: std::env::var("RAPIDAPI_KEY")
                .or_else(|_| std::env::var("JSEARCH_API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty()),
            jsearch_country: std::env::var("JSEARCH_COUNTRY").unwrap_or_else(|_| "us".to_string()),
            chat_recent_window: recent_window(env_or("CHAT_RECENT_WINDOW", 10)?)?,
            chat_max_job_cards: env_or("CHAT_MAX_JOB_CARDS", 10)?,
            job_cache_ttl_secs: env_or("JOB_CACHE_TTL_SECS", 3600)?,
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn recent_window(window: usize) -> Result<usize> {
    ensure!(
        window >= MIN_RECENT_WINDOW,
        "CHAT_RECENT_WINDOW must be at least {MIN_RECENT_WINDOW}, got {window}"
    );
    Ok(window)
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
