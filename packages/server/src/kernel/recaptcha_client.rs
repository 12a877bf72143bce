//! Google reCAPTCHA v3 verifier.
//!
//! Posts the client token to the siteverify endpoint and reduces the
//! response to a human/bot boolean. v3 responses carry a score; anything
//! under the cutoff is treated as a bot even when `success` is true.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::traits::BaseCaptchaVerifier;

const VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// v3 score cutoff (0.0 = almost certainly a bot, 1.0 = almost certainly human).
const MIN_SCORE: f64 = 0.5;

/// reCAPTCHA siteverify client
pub struct RecaptchaVerifier {
    secret: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

impl RecaptchaVerifier {
    /// Create a new verifier for the given server-side secret
    pub fn new(secret: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { secret, client })
    }

    fn is_human(response: &VerifyResponse) -> bool {
        // v2 responses have no score; success alone decides.
        response.success && response.score.map_or(true, |score| score >= MIN_SCORE)
    }
}

#[async_trait]
impl BaseCaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<bool> {
        let response = self
            .client
            .post(VERIFY_URL)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await
            .context("Failed to reach reCAPTCHA siteverify")?;

        if !response.status().is_success() {
            anyhow::bail!("reCAPTCHA siteverify error: {}", response.status());
        }

        let verdict: VerifyResponse = response
            .json()
            .await
            .context("Failed to parse reCAPTCHA response")?;

        if !verdict.success && !verdict.error_codes.is_empty() {
            tracing::debug!(errors = ?verdict.error_codes, "reCAPTCHA rejected token");
        }

        Ok(Self::is_human(&verdict))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_with_high_score_is_human() {
        let response = VerifyResponse {
            success: true,
            score: Some(0.9),
            error_codes: vec![],
        };
        assert!(RecaptchaVerifier::is_human(&response));
    }

    #[test]
    fn test_success_with_low_score_is_bot() {
        let response = VerifyResponse {
            success: true,
            score: Some(0.1),
            error_codes: vec![],
        };
        assert!(!RecaptchaVerifier::is_human(&response));
    }

    #[test]
    fn test_failure_is_bot_regardless_of_score() {
        let response = VerifyResponse {
            success: false,
            score: Some(0.9),
            error_codes: vec!["invalid-input-response".to_string()],
        };
        assert!(!RecaptchaVerifier::is_human(&response));
    }

    #[test]
    fn test_scoreless_v2_response_uses_success() {
        let response = VerifyResponse {
            success: true,
            score: None,
            error_codes: vec![],
        };
        assert!(RecaptchaVerifier::is_human(&response));
    }
}
