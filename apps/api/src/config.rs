use anyhow::{Context, Result};

use crate::llm_client::Provider;

/// Application configuration loaded from environment variables.
///
/// Every LLM key is optional: a missing key leaves that provider unconfigured
/// and all of its calls take the local fallback path.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres URL for the `daily_news` table. In-memory store when absent.
    pub database_url: Option<String>,
    pub kimi_api_key: Option<String>,
    pub kimi_base_url: String,
    pub tuzi_api_key: Option<String>,
    pub tuzi_base_url: String,
    pub port: u16,
    pub rust_log: String,
    /// How many matches the pipeline returns after sorting.
    pub match_limit: usize,
    /// Score candidates with the LLM (falling back to keywords) instead of keywords only.
    pub enable_llm_matching: bool,
    pub news_retention_days: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            kimi_api_key: optional_env("KIMI_API_KEY"),
            kimi_base_url: optional_env("KIMI_BASE_URL")
                .unwrap_or_else(|| Provider::Moonshot.default_base_url().to_string()),
            tuzi_api_key: optional_env("TUZI_API_KEY"),
            tuzi_base_url: optional_env("TUZI_BASE_URL")
                .unwrap_or_else(|| Provider::Tuzi.default_base_url().to_string()),
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            match_limit: parse_env("MATCH_LIMIT", 10)
                .context("MATCH_LIMIT must be a positive integer")?,
            enable_llm_matching: parse_env("ENABLE_LLM_MATCHING", true)
                .context("ENABLE_LLM_MATCHING must be true or false")?,
            news_retention_days: parse_env("NEWS_RETENTION_DAYS", 3)
                .context("NEWS_RETENTION_DAYS must be an integer")?,
        })
    }
}

/// Reads an env var, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Invalid value '{raw}' for '{key}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration with no external services: every LLM call falls back.
    pub fn offline() -> Self {
        Config {
            database_url: None,
            kimi_api_key: None,
            kimi_base_url: Provider::Moonshot.default_base_url().to_string(),
            tuzi_api_key: None,
            tuzi_base_url: Provider::Tuzi.default_base_url().to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            match_limit: 10,
            enable_llm_matching: true,
            news_retention_days: 3,
        }
    }
}
