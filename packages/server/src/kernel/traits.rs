// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic. The submission
// lifecycle (what a verdict means for a record) lives in domain actions that
// consume these traits.
//
// Naming convention: Base* for trait names (e.g., BaseSecurityScanner)

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::domains::links::models::ScanVerdict;

// =============================================================================
// Security Scanner Trait (Infrastructure - URL classification)
// =============================================================================

/// Outcome of a completed security scan.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub verdict: ScanVerdict,
    /// Opaque engine payload, stored verbatim on the record.
    pub detail: JsonValue,
}

#[async_trait]
pub trait BaseSecurityScanner: Send + Sync {
    /// Classify a URL. May take seconds to minutes or fail outright; callers
    /// must never hold a request open on it.
    async fn scan(&self, url: &str) -> Result<ScanOutcome>;
}

// =============================================================================
// Metadata Fetcher Trait (Infrastructure - link previews)
// =============================================================================

/// Best-effort page preview for link cards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagePreview {
    pub title: Option<String>,
    pub image: Option<String>,
}

#[async_trait]
pub trait BaseMetadataFetcher: Send + Sync {
    /// Fetch a title/image preview for a URL.
    async fn fetch_preview(&self, url: &str) -> Result<PagePreview>;
}

// =============================================================================
// CAPTCHA Verifier Trait (Infrastructure - human/bot verdict)
// =============================================================================

#[async_trait]
pub trait BaseCaptchaVerifier: Send + Sync {
    /// Returns true when the client token belongs to a human.
    async fn verify(&self, token: &str) -> Result<bool>;
}

// =============================================================================
// Content Filter Trait (Infrastructure - pre-acceptance screening)
// =============================================================================

/// Verdict returned before a submission is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentVerdict {
    Safe,
    Unsafe { reason: String },
}

#[async_trait]
pub trait BaseContentFilter: Send + Sync {
    /// Classify a (url, message) pair before acceptance.
    async fn check(&self, url: &str, message: &str) -> Result<ContentVerdict>;
}
