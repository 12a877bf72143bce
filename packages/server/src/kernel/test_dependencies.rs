// TestDependencies - mock implementations for testing
//
// Provides mock collaborators that can be assembled into ServerDeps for
// tests, alongside the in-memory link store. Mocks record their calls so
// tests can assert on interaction, not just state.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use super::deps::ServerDeps;
use super::traits::{
    BaseCaptchaVerifier, BaseContentFilter, BaseMetadataFetcher, BaseSecurityScanner,
    ContentVerdict, PagePreview, ScanOutcome,
};
use crate::domains::links::models::ScanVerdict;
use crate::domains::links::MemoryLinkStore;

// =============================================================================
// Mock Security Scanner
// =============================================================================

pub struct MockSecurityScanner {
    outcomes: Mutex<Vec<ScanOutcome>>,
    calls: Mutex<Vec<String>>,
    fail: bool,
    stall: bool,
}

impl MockSecurityScanner {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            fail: false,
            stall: false,
        }
    }

    /// Queue a full outcome to be returned (FIFO).
    pub fn with_outcome(self, outcome: ScanOutcome) -> Self {
        self.outcomes.lock().unwrap().push(outcome);
        self
    }

    /// Queue a verdict with a canned detail payload.
    pub fn with_verdict(self, verdict: ScanVerdict) -> Self {
        let detail = serde_json::json!({
            "provider": "mock",
            "verdict": verdict.to_string(),
        });
        self.with_outcome(ScanOutcome { verdict, detail })
    }

    /// Every scan call fails.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Every scan call hangs forever (for proving the request path never
    /// waits on the engine).
    pub fn stalled(mut self) -> Self {
        self.stall = true;
        self
    }

    /// Get all URLs that were scanned
    pub fn scan_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Check if a URL was scanned
    pub fn was_scanned(&self, url: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|u| u == url)
    }
}

#[async_trait]
impl BaseSecurityScanner for MockSecurityScanner {
    async fn scan(&self, url: &str) -> Result<ScanOutcome> {
        // Record the call
        self.calls.lock().unwrap().push(url.to_string());

        if self.stall {
            std::future::pending::<()>().await;
        }
        if self.fail {
            anyhow::bail!("mock scanner failure");
        }

        let mut outcomes = self.outcomes.lock().unwrap();
        if !outcomes.is_empty() {
            Ok(outcomes.remove(0))
        } else {
            Ok(ScanOutcome {
                verdict: ScanVerdict::Safe,
                detail: serde_json::json!({ "provider": "mock" }),
            })
        }
    }
}

// =============================================================================
// Mock Metadata Fetcher
// =============================================================================

pub struct MockMetadataFetcher {
    preview: Mutex<Option<PagePreview>>,
    calls: Mutex<Vec<String>>,
    fail: bool,
}

impl MockMetadataFetcher {
    pub fn new() -> Self {
        Self {
            preview: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn with_preview(self, title: &str, image: Option<&str>) -> Self {
        *self.preview.lock().unwrap() = Some(PagePreview {
            title: Some(title.to_string()),
            image: image.map(str::to_string),
        });
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn fetch_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseMetadataFetcher for MockMetadataFetcher {
    async fn fetch_preview(&self, url: &str) -> Result<PagePreview> {
        self.calls.lock().unwrap().push(url.to_string());

        if self.fail {
            anyhow::bail!("mock metadata fetch failure");
        }

        Ok(self.preview.lock().unwrap().clone().unwrap_or_default())
    }
}

// =============================================================================
// Mock CAPTCHA Verifier
// =============================================================================

pub struct MockCaptchaVerifier {
    verdict: bool,
    calls: Mutex<Vec<String>>,
    fail: bool,
}

impl MockCaptchaVerifier {
    /// Verifier that accepts every token.
    pub fn accepting() -> Self {
        Self {
            verdict: true,
            calls: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// Verifier that rejects every token as a bot.
    pub fn rejecting() -> Self {
        Self {
            verdict: false,
            calls: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// Verifier whose backend is unreachable.
    pub fn failing() -> Self {
        Self {
            verdict: false,
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn verify_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseCaptchaVerifier for MockCaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<bool> {
        self.calls.lock().unwrap().push(token.to_string());

        if self.fail {
            anyhow::bail!("mock captcha backend unreachable");
        }
        Ok(self.verdict)
    }
}

// =============================================================================
// Mock Content Filter
// =============================================================================

pub struct MockContentFilter {
    verdict: ContentVerdict,
    fail: bool,
}

impl MockContentFilter {
    pub fn safe() -> Self {
        Self {
            verdict: ContentVerdict::Safe,
            fail: false,
        }
    }

    pub fn unsafe_with_reason(reason: &str) -> Self {
        Self {
            verdict: ContentVerdict::Unsafe {
                reason: reason.to_string(),
            },
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            verdict: ContentVerdict::Safe,
            fail: true,
        }
    }
}

#[async_trait]
impl BaseContentFilter for MockContentFilter {
    async fn check(&self, _url: &str, _message: &str) -> Result<ContentVerdict> {
        if self.fail {
            anyhow::bail!("mock content filter failure");
        }
        Ok(self.verdict.clone())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Bundle of test doubles wired the way `server/app.rs` wires production
/// services. Fields are public so tests can swap any collaborator before
/// building `ServerDeps`.
pub struct TestDependencies {
    pub store: Arc<MemoryLinkStore>,
    pub scanner: Arc<MockSecurityScanner>,
    pub metadata: Arc<MockMetadataFetcher>,
    pub captcha: Arc<MockCaptchaVerifier>,
    pub content_filter: Arc<MockContentFilter>,
    pub admin_password: String,
    pub verified_user_password: Option<String>,
}

impl TestDependencies {
    /// Happy-path defaults: empty store, safe scanner, empty previews,
    /// accepting CAPTCHA, permissive filter.
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryLinkStore::new()),
            scanner: Arc::new(MockSecurityScanner::new()),
            metadata: Arc::new(MockMetadataFetcher::new()),
            captcha: Arc::new(MockCaptchaVerifier::accepting()),
            content_filter: Arc::new(MockContentFilter::safe()),
            admin_password: "test-admin-password".to_string(),
            verified_user_password: Some("test-verify-secret".to_string()),
        }
    }

    /// Assemble a `ServerDeps` from the current doubles.
    pub fn server_deps(&self) -> Arc<ServerDeps> {
        Arc::new(ServerDeps::new(
            self.store.clone(),
            self.scanner.clone(),
            self.metadata.clone(),
            Some(self.captcha.clone()),
            self.content_filter.clone(),
            self.admin_password.clone(),
            self.verified_user_password.clone(),
        ))
    }

    /// Same, with CAPTCHA verification disabled entirely.
    pub fn server_deps_without_captcha(&self) -> Arc<ServerDeps> {
        Arc::new(ServerDeps::new(
            self.store.clone(),
            self.scanner.clone(),
            self.metadata.clone(),
            None,
            self.content_filter.clone(),
            self.admin_password.clone(),
            self.verified_user_password.clone(),
        ))
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
