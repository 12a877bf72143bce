//! urlscan.io client - the production security scan engine.
//!
//! A scan is two requests: submit the URL, then poll the result endpoint
//! until the engine has finished processing (it returns 404 while the scan
//! is still running). Polling is bounded; a scan that never settles is
//! reported as an error and the record stays `pending`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::traits::{BaseSecurityScanner, ScanOutcome};
use crate::domains::links::models::ScanVerdict;

const SUBMIT_URL: &str = "https://urlscan.io/api/v1/scan/";
const RESULT_URL: &str = "https://urlscan.io/api/v1/result/";

/// Overall score at and above which a non-malicious result is still treated
/// as suspicious (urlscan scores range -100..100).
const SUSPICIOUS_SCORE: i64 = 50;

/// urlscan.io API client
pub struct UrlscanScanner {
    api_key: String,
    client: reqwest::Client,
    poll_attempts: u32,
    poll_interval: Duration,
}

#[derive(Debug, Serialize)]
struct ScanRequest<'a> {
    url: &'a str,
    visibility: &'a str,
}

#[derive(Debug, Deserialize)]
struct ScanSubmitResponse {
    uuid: String,
}

#[derive(Debug, Deserialize)]
struct ScanResultResponse {
    #[serde(default)]
    verdicts: Verdicts,
    #[serde(default)]
    task: Task,
}

#[derive(Debug, Default, Deserialize)]
struct Verdicts {
    #[serde(default)]
    overall: OverallVerdict,
}

#[derive(Debug, Default, Deserialize)]
struct OverallVerdict {
    #[serde(default)]
    score: i64,
    #[serde(default)]
    malicious: bool,
    #[serde(default)]
    categories: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Task {
    #[serde(rename = "reportURL", default)]
    report_url: Option<String>,
}

impl UrlscanScanner {
    /// Create a new urlscan.io client
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            api_key,
            client,
            poll_attempts: 12,
            poll_interval: Duration::from_secs(10),
        })
    }

    /// Override polling cadence (shorter in tests).
    pub fn with_polling(mut self, attempts: u32, interval: Duration) -> Self {
        self.poll_attempts = attempts;
        self.poll_interval = interval;
        self
    }

    async fn submit(&self, url: &str) -> Result<String> {
        let request = ScanRequest {
            url,
            visibility: "unlisted",
        };

        let response = self
            .client
            .post(SUBMIT_URL)
            .header("API-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to submit URL to urlscan.io")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("urlscan.io submit error {}: {}", status, body);
        }

        let submitted: ScanSubmitResponse = response
            .json()
            .await
            .context("Failed to parse urlscan.io submit response")?;

        Ok(submitted.uuid)
    }

    async fn poll_result(&self, scan_uuid: &str) -> Result<ScanResultResponse> {
        let result_url = format!("{RESULT_URL}{scan_uuid}/");

        for _ in 0..self.poll_attempts {
            tokio::time::sleep(self.poll_interval).await;

            let response = self
                .client
                .get(&result_url)
                .header("API-Key", &self.api_key)
                .send()
                .await
                .context("Failed to fetch urlscan.io result")?;

            // 404 means the scan has not finished processing yet.
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                continue;
            }

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("urlscan.io result error {}: {}", status, body);
            }

            return response
                .json()
                .await
                .context("Failed to parse urlscan.io result");
        }

        anyhow::bail!(
            "urlscan.io scan {} not ready after {} attempts",
            scan_uuid,
            self.poll_attempts
        )
    }

    fn classify(overall: &OverallVerdict) -> ScanVerdict {
        if overall.malicious {
            ScanVerdict::Malicious
        } else if overall.score >= SUSPICIOUS_SCORE {
            ScanVerdict::Suspicious
        } else {
            ScanVerdict::Safe
        }
    }
}

#[async_trait]
impl BaseSecurityScanner for UrlscanScanner {
    async fn scan(&self, url: &str) -> Result<ScanOutcome> {
        let scan_uuid = self.submit(url).await?;
        let result = self.poll_result(&scan_uuid).await?;

        let verdict = Self::classify(&result.verdicts.overall);
        let detail = serde_json::json!({
            "provider": "urlscan.io",
            "uuid": scan_uuid,
            "score": result.verdicts.overall.score,
            "malicious": result.verdicts.overall.malicious,
            "categories": result.verdicts.overall.categories,
            "reportUrl": result.task.report_url,
        });

        Ok(ScanOutcome { verdict, detail })
    }
}
