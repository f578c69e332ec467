use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails fast if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub matcher_url: String,
    pub matcher_api_key: String,
    /// Shared secret for webhook signature checks. `None` means open mode:
    /// every delivery is accepted and a warning is logged per request.
    pub webhook_secret: Option<String>,
    /// Cap (in chars) on the raw payload copy kept in webhook_logs rows.
    pub payload_log_max_chars: usize,
    pub storage_timeout_secs: u64,
    pub matcher_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        // Open mode: an absent or empty secret disables signature checks.
        // main() logs the warning once tracing is up.
        let webhook_secret = std::env::var("WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            matcher_url: require_env("MATCHER_URL")?,
            matcher_api_key: require_env("MATCHER_API_KEY")?,
            webhook_secret,
            payload_log_max_chars: env_or("PAYLOAD_LOG_MAX_CHARS", 10_000)?,
            storage_timeout_secs: env_or("STORAGE_TIMEOUT_SECS", 10)?,
            matcher_timeout_secs: env_or("MATCHER_TIMEOUT_SECS", 60)?,
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}
