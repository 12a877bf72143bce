use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Shared admin credential, presented as a bearer token on /api/admin routes.
    pub admin_password: String,
    /// Shared secret that grants the verified badge at submission time.
    /// Unset means no submission can earn the badge.
    pub verified_user_password: Option<String>,
    /// reCAPTCHA server-side secret. Unset disables CAPTCHA verification.
    pub recaptcha_secret: Option<String>,
    /// urlscan.io API key. Unset disables scanning; links stay `pending`.
    pub urlscan_api_key: Option<String>,
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
            admin_password: env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD must be set")?,
            verified_user_password: env::var("VERIFIED_USER_PASSWORD").ok(),
            recaptcha_secret: env::var("RECAPTCHA_SECRET_KEY").ok(),
            urlscan_api_key: env::var("URLSCAN_API_KEY").ok(),
        })
    }
}
