//! Server dependencies for actions (using traits for testability)
//!
//! The central dependency container handed to every domain action. All
//! external services sit behind trait abstractions so tests can swap in the
//! mocks from `test_dependencies.rs` and the in-memory store.

use std::sync::Arc;

use super::traits::{
    BaseCaptchaVerifier, BaseContentFilter, BaseMetadataFetcher, BaseSecurityScanner,
};
use crate::domains::links::store::LinkStore;

/// Server dependencies accessible to actions.
#[derive(Clone)]
pub struct ServerDeps {
    pub links: Arc<dyn LinkStore>,
    pub scanner: Arc<dyn BaseSecurityScanner>,
    pub metadata: Arc<dyn BaseMetadataFetcher>,
    /// CAPTCHA verification is optional; None skips the human check.
    pub captcha: Option<Arc<dyn BaseCaptchaVerifier>>,
    pub content_filter: Arc<dyn BaseContentFilter>,
    /// Shared admin credential for the moderation surface.
    pub admin_password: String,
    /// Shared secret granting the verified badge at submission time;
    /// None means the badge can never be earned.
    pub verified_user_password: Option<String>,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        links: Arc<dyn LinkStore>,
        scanner: Arc<dyn BaseSecurityScanner>,
        metadata: Arc<dyn BaseMetadataFetcher>,
        captcha: Option<Arc<dyn BaseCaptchaVerifier>>,
        content_filter: Arc<dyn BaseContentFilter>,
        admin_password: String,
        verified_user_password: Option<String>,
    ) -> Self {
        Self {
            links,
            scanner,
            metadata,
            captcha,
            content_filter,
            admin_password,
            verified_user_password,
        }
    }
}
