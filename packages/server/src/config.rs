use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// HS256 secret of the auth provider. `None` disables signature checks.
    pub jwt_secret: Option<String>,
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    /// Models tried in order by the analytics assistant.
    pub analytics_models: Vec<String>,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_from_number: Option<String>,
    pub email_api_key: Option<String>,
    pub email_from: String,
    pub storage_url: Option<String>,
    pub storage_service_key: Option<String>,
    pub storage_bucket: String,
    pub allowed_origins: Vec<String>,
    pub alerts_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: non_empty("JWT_SECRET"),
            openai_api_key: env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            openai_base_url: non_empty("OPENAI_BASE_URL"),
            analytics_models: parse_list(
                &env::var("ANALYTICS_MODELS")
                    .unwrap_or_else(|_| "gpt-4o-mini,gpt-3.5-turbo".to_string()),
            ),
            twilio_account_sid: non_empty("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: non_empty("TWILIO_AUTH_TOKEN"),
            twilio_from_number: non_empty("TWILIO_FROM_NUMBER"),
            email_api_key: non_empty("EMAIL_API_KEY"),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "CareWatch RDC <noreply@carewatch.cd>".to_string()),
            storage_url: non_empty("STORAGE_URL"),
            storage_service_key: non_empty("STORAGE_SERVICE_KEY"),
            storage_bucket: env::var("STORAGE_BUCKET")
                .unwrap_or_else(|_| "orphanage-documents".to_string()),
            allowed_origins: parse_list(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
            alerts_enabled: env::var("ALERTS_ENABLED")
                .map(|v| parse_bool(&v))
                .unwrap_or(true),
        })
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list(" gpt-4o-mini , gpt-3.5-turbo,,"),
            vec!["gpt-4o-mini".to_string(), "gpt-3.5-turbo".to_string()]
        );
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(" OFF "));
    }
}
