use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::import::ImportPolicy;
use crate::llm_client::MAX_ATTEMPTS;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub upload_dir: PathBuf,
    pub job_description_path: PathBuf,
    pub import_policy: ImportPolicy,
    pub llm_max_attempts: u32,
    pub llm_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL", "sqlite://talentscreen.db?mode=rwc"),
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            upload_dir: optional_env("UPLOAD_DIR", "uploads").into(),
            job_description_path: optional_env("JOB_DESCRIPTION_PATH", "job_description.json")
                .into(),
            import_policy: parse_env("CSV_IMPORT_POLICY", "best_effort")?,
            llm_max_attempts: check_llm_attempts(parse_env("LLM_MAX_ATTEMPTS", "1")?)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", "120")?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", "10485760")?,
            port: parse_env("PORT", "8080")?,
            rust_log: optional_env("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = optional_env(key, default);
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("{key} has invalid value '{raw}': {e}"))
}

fn check_llm_attempts(attempts: u32) -> Result<u32> {
    if (1..=MAX_ATTEMPTS).contains(&attempts) {
        Ok(attempts)
    } else {
        anyhow::bail!("LLM_MAX_ATTEMPTS must be between 1 and {MAX_ATTEMPTS}, got {attempts}")
    }
}
