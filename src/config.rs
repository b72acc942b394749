// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup; the resulting clients are shared through `AppState`.

use std::env;

pub const STRAVA_API_URL: &str = "https://www.strava.com/api/v3";
pub const STRAVA_OAUTH_URL: &str = "https://www.strava.com/oauth";
pub const NOTION_API_URL: &str = "https://api.notion.com/v1";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Strava OAuth client ID (public)
    pub strava_client_id: String,
    /// Public base URL of this service, used for the webhook callback
    pub base_url: String,
    /// Server port
    pub port: u16,
    /// Strava REST API base URL
    pub strava_api_url: String,
    /// Strava OAuth base URL (token exchange and refresh)
    pub strava_oauth_url: String,
    /// Notion REST API base URL
    pub notion_api_url: String,
    /// Notion database holding one page per activity
    pub notion_database_id: String,
    /// Notion database of exercises referenced by the "Exercises Done" relation
    pub notion_exercises_database_id: Option<String>,
    /// Seconds before `expires_at` at which a token already counts as expired
    pub token_expiry_margin_secs: i64,
    /// Timeout applied to every outbound HTTP request
    pub http_timeout_secs: u64,
    /// Postgres connection string for the credential store
    pub database_url: String,

    // --- Secrets ---
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Webhook verification token
    pub webhook_verify_token: String,
    /// Notion integration token
    pub notion_api_key: String,
    /// Bearer token guarding the subscription management routes (empty disables them)
    pub admin_token: String,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            base_url: "http://localhost:8080".to_string(),
            port: 8080,
            strava_api_url: STRAVA_API_URL.to_string(),
            strava_oauth_url: STRAVA_OAUTH_URL.to_string(),
            notion_api_url: NOTION_API_URL.to_string(),
            notion_database_id: "test_database".to_string(),
            notion_exercises_database_id: None,
            token_expiry_margin_secs: 0,
            http_timeout_secs: 5,
            database_url: "postgres://localhost/strava_notion_sync_test".to_string(),
            strava_client_secret: "test_secret".to_string(),
            webhook_verify_token: "test_verify_token".to_string(),
            notion_api_key: "test_notion_key".to_string(),
            admin_token: "test_admin_token".to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            strava_client_id: required("STRAVA_CLIENT_ID")?,
            base_url: env::var("BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            port: parse_or("PORT", 8080)?,
            strava_api_url: env::var("STRAVA_API_URL")
                .unwrap_or_else(|_| STRAVA_API_URL.to_string()),
            strava_oauth_url: env::var("STRAVA_OAUTH_URL")
                .unwrap_or_else(|_| STRAVA_OAUTH_URL.to_string()),
            notion_api_url: env::var("NOTION_API_URL")
                .unwrap_or_else(|_| NOTION_API_URL.to_string()),
            notion_database_id: required("NOTION_DATABASE_ID")?,
            notion_exercises_database_id: env::var("NOTION_EXERCISES_DATABASE_ID")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            token_expiry_margin_secs: parse_or("TOKEN_EXPIRY_MARGIN_SECS", 0)?,
            http_timeout_secs: parse_or("HTTP_TIMEOUT_SECS", 30)?,
            database_url: required("DATABASE_URL")?,

            strava_client_secret: required("STRAVA_CLIENT_SECRET")?,
            webhook_verify_token: required("WEBHOOK_VERIFY_TOKEN")?,
            notion_api_key: required("NOTION_API_KEY")?,
            admin_token: env::var("ADMIN_TOKEN")
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
        })
    }
}

/// A set, non-blank environment variable.
fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(name, v)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("STRAVA_CLIENT_ID", "test_id");
        env::set_var("STRAVA_CLIENT_SECRET", " test_secret\n");
        env::set_var("WEBHOOK_VERIFY_TOKEN", "test_verify");
        env::set_var("NOTION_API_KEY", "secret_notion");
        env::set_var("NOTION_DATABASE_ID", "db123");
        env::set_var("DATABASE_URL", "postgres://localhost/test");
        env::set_var("BASE_URL", "https://sync.example.com/");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.strava_client_id, "test_id");
        assert_eq!(config.strava_client_secret, "test_secret");
        assert_eq!(config.base_url, "https://sync.example.com");
        assert_eq!(config.strava_api_url, STRAVA_API_URL);
        assert_eq!(config.token_expiry_margin_secs, 0);
    }

    #[test]
    fn test_required_rejects_blank_values() {
        env::set_var("TEST_REQUIRED_BLANK", "  \n");
        assert!(matches!(
            required("TEST_REQUIRED_BLANK"),
            Err(ConfigError::Missing("TEST_REQUIRED_BLANK"))
        ));

        env::set_var("TEST_REQUIRED_SET", " value ");
        assert_eq!(required("TEST_REQUIRED_SET").unwrap(), "value");
    }

    #[test]
    fn test_parse_or_rejects_garbage() {
        env::set_var("TEST_PARSE_OR_PORT", "eighty");
        let result: Result<u16, _> = parse_or("TEST_PARSE_OR_PORT", 8080);
        assert!(matches!(result, Err(ConfigError::Invalid("TEST_PARSE_OR_PORT", _))));

        let result: Result<u16, _> = parse_or("TEST_PARSE_OR_UNSET", 8080);
        assert_eq!(result.unwrap(), 8080);
    }
}
