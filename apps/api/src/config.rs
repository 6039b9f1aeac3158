use std::str::FromStr;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_API_URL;
use crate::resume::{DEFAULT_MAX_PROMPT_CHARS, DEFAULT_MIN_TEXT_LENGTH};

/// Application configuration loaded from environment variables.
///
/// Nothing is strictly required: a missing `ANTHROPIC_API_KEY` still lets the
/// service start, and every model stage then fails with `ModelUnavailable`.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub anthropic_api_url: String,
    pub llm_timeout_secs: u64,
    pub min_text_length: usize,
    pub max_prompt_chars: usize,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            anthropic_api_key: None,
            anthropic_api_url: DEFAULT_API_URL.to_string(),
            llm_timeout_secs: 30,
            min_text_length: DEFAULT_MIN_TEXT_LENGTH,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            max_upload_bytes: 10 * 1024 * 1024,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        Ok(Config {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            anthropic_api_url: optional_env("ANTHROPIC_API_URL")
                .unwrap_or(defaults.anthropic_api_url),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", defaults.llm_timeout_secs)?,
            min_text_length: parse_env("MIN_TEXT_LENGTH", defaults.min_text_length)?,
            max_prompt_chars: parse_env("MAX_PROMPT_CHARS", defaults.max_prompt_chars)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            port: parse_env("PORT", defaults.port)?,
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

/// Reads a variable, treating empty or whitespace-only values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
