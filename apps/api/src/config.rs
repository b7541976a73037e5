use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub openai_api_key: String,
    pub jwt_secret: String,
    pub jwt_ttl_minutes: i64,
    pub port: u16,
    pub rust_log: String,
    /// Directory receiving one `<UPPER_SNAKE_TITLE>.xml` per approved profile.
    pub export_dir: PathBuf,
    /// Server-side copy of the last processed spreadsheet.
    pub batch_output_dir: PathBuf,
    /// Request body limit for `/upload`.
    pub max_upload_bytes: usize,
    pub approval_base_url: String,
    pub pending_token_ttl_days: i64,
    pub management_level_id: String,
    pub job_family_id: String,
    pub llm_max_attempts: u32,
    pub llm_backoff_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            jwt_secret: require_env("JWT_SECRET")?,
            jwt_ttl_minutes: parse_env("JWT_TTL_MINUTES", 720)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            export_dir: std::env::var("EXPORT_DIR")
                .unwrap_or_else(|_| "exports/job_profiles".to_string())
                .into(),
            batch_output_dir: std::env::var("BATCH_OUTPUT_DIR")
                .unwrap_or_else(|_| "processed".to_string())
                .into(),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 50 * 1024 * 1024)?,
            approval_base_url: std::env::var("APPROVAL_BASE_URL").unwrap_or_else(|_| {
                "http://localhost:5174/approve-job-description".to_string()
            }),
            pending_token_ttl_days: parse_env("PENDING_TOKEN_TTL_DAYS", 7)?,
            management_level_id: std::env::var("MANAGEMENT_LEVEL_ID")
                .unwrap_or_else(|_| "MANAGEMENT_LEVEL-3-30".to_string()),
            job_family_id: std::env::var("JOB_FAMILY_ID")
                .unwrap_or_else(|_| "EMPLOYEE_RELATIONS".to_string()),
            llm_max_attempts: parse_env("LLM_MAX_ATTEMPTS", 3)?,
            llm_backoff_ms: parse_env("LLM_BACKOFF_MS", 2000)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
