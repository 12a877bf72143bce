//! Link submission action - intake validation and record creation.
//!
//! The submission path is: CAPTCHA verdict, content filter verdict,
//! structural validation, normalization, verified-badge check, best-effort
//! metadata, persist, then a fire-and-forget scan dispatch. The caller gets
//! the new id and a `pending` scan status immediately; nothing in this path
//! waits on the scan engine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::clamp;
use crate::common::{AppError, AppResult, LinkId};
use crate::domains::links::models::{LinkTag, NewLink, SecurityStatus};
use crate::domains::links::store::LinkStore;
use crate::kernel::scan::dispatch_scan;
use crate::kernel::{
    BaseCaptchaVerifier, BaseContentFilter, BaseMetadataFetcher, ContentVerdict, ServerDeps,
};

/// Maximum characters kept per field, matching the stored document caps.
const FROM_MAX_CHARS: usize = 100;
const MESSAGE_MAX_CHARS: usize = 500;
const URL_MAX_CHARS: usize = 2000;

/// Raw submission payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitLink {
    pub from: Option<String>,
    pub message: Option<String>,
    pub url: Option<String>,
    pub is_anonymous: bool,
    pub tags: Vec<String>,
    pub meta_title: Option<String>,
    pub meta_image: Option<String>,
    pub verify_password: Option<String>,
    pub captcha_token: Option<String>,
}

/// What the submitter gets back: the id and the (always pending) scan state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub link_id: LinkId,
    pub security_status: SecurityStatus,
}

/// Accept a link submission.
pub async fn submit_link(input: SubmitLink, deps: &Arc<ServerDeps>) -> AppResult<SubmitReceipt> {
    // Human check first. A bot verdict rejects; an unreachable verifier is
    // logged and the submission proceeds (degraded acceptance, not failure).
    if let (Some(verifier), Some(token)) = (&deps.captcha, &input.captcha_token) {
        match verifier.verify(token).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(AppError::Validation("CAPTCHA verification failed".into()));
            }
            Err(error) => {
                warn!(error = %error, "CAPTCHA verifier unreachable; accepting submission");
            }
        }
    }

    // Basic validation
    let message = input.message.as_deref().map(str::trim).unwrap_or("");
    let url = input.url.as_deref().map(str::trim).unwrap_or("");
    if message.is_empty() || url.is_empty() {
        return Err(AppError::Validation("Missing required fields".into()));
    }

    // Validate tags (at least 1, all from the catalog)
    if input.tags.is_empty() {
        return Err(AppError::Validation("At least one tag is required".into()));
    }
    for tag in &input.tags {
        tag.parse::<LinkTag>()
            .map_err(|_| AppError::Validation(format!("Unknown tag: {tag}")))?;
    }

    // Simple URL validation - just check it starts with http/https
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(AppError::Validation(
            "Invalid URL. Must start with http:// or https://".into(),
        ));
    }

    // Content screening. Unsafe verdicts reject; a broken filter does not.
    match deps.content_filter.check(url, message).await {
        Ok(ContentVerdict::Safe) => {}
        Ok(ContentVerdict::Unsafe { reason }) => {
            return Err(AppError::Validation(format!(
                "Submission rejected: {reason}"
            )));
        }
        Err(error) => {
            warn!(error = %error, "content filter unavailable; accepting submission");
        }
    }

    // Normalize
    let from_name = if input.is_anonymous {
        "Anonymous".to_string()
    } else {
        let cleaned = clamp(input.from.as_deref().unwrap_or(""), FROM_MAX_CHARS);
        if cleaned.is_empty() {
            "Anonymous".to_string()
        } else {
            cleaned
        }
    };
    let message = clamp(message, MESSAGE_MAX_CHARS);
    let url = clamp(url, URL_MAX_CHARS);

    // Verified badge: exact secret match, never for anonymous submissions.
    let is_verified = !input.is_anonymous
        && matches!(
            (&deps.verified_user_password, &input.verify_password),
            (Some(secret), Some(given)) if given == secret
        );

    let (meta_title, meta_image) = resolve_preview(&input, &url, deps).await;

    let record = deps
        .links
        .create(
            NewLink::builder()
                .from_name(from_name)
                .message(message)
                .url(url)
                .tags(input.tags)
                .is_anonymous(input.is_anonymous)
                .is_verified(is_verified)
                .meta_title(meta_title)
                .meta_image(meta_image)
                .build(),
        )
        .await
        .map_err(AppError::Internal)?;

    info!(
        link_id = %record.id,
        is_anonymous = record.is_anonymous,
        is_verified = record.is_verified,
        "link submitted"
    );

    // Fire and forget - don't await
    dispatch_scan(deps, record.id, record.url.clone());

    Ok(SubmitReceipt {
        link_id: record.id,
        security_status: SecurityStatus::Pending,
    })
}

/// Settle the display metadata: caller-supplied values win, then a
/// best-effort fetch, then the URL itself as the title. Never fails.
async fn resolve_preview(
    input: &SubmitLink,
    url: &str,
    deps: &Arc<ServerDeps>,
) -> (String, Option<String>) {
    if let Some(title) = input.meta_title.as_deref().map(str::trim) {
        if !title.is_empty() {
            return (title.to_string(), input.meta_image.clone());
        }
    }

    match deps.metadata.fetch_preview(url).await {
        Ok(preview) => (
            preview.title.unwrap_or_else(|| url.to_string()),
            preview.image.or_else(|| input.meta_image.clone()),
        ),
        Err(error) => {
            warn!(error = %error, url = %url, "preview fetch failed; using bare URL");
            (url.to_string(), input.meta_image.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::links::store::LinkStore;
    use crate::kernel::test_dependencies::{
        MockCaptchaVerifier, MockContentFilter, MockMetadataFetcher, MockSecurityScanner,
        TestDependencies,
    };
    use std::time::Duration;

    fn valid_input() -> SubmitLink {
        SubmitLink {
            from: Some("Ada".to_string()),
            message: Some("a great compiler resource".to_string()),
            url: Some("https://example.com".to_string()),
            tags: vec!["code".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_submit_creates_approved_pending_record() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps();

        let receipt = submit_link(valid_input(), &deps).await.unwrap();
        assert_eq!(receipt.security_status, SecurityStatus::Pending);

        let record = deps.links.get(receipt.link_id).await.unwrap().unwrap();
        assert_eq!(record.status, "approved");
        assert_eq!(record.security_status, "pending");
        assert_eq!(record.from_name, "Ada");
        assert_eq!(record.report_count, 0);
    }

    #[tokio::test]
    async fn test_missing_message_or_url_fails() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps();

        let mut input = valid_input();
        input.message = Some("   ".to_string());
        assert!(matches!(
            submit_link(input, &deps).await,
            Err(AppError::Validation(_))
        ));

        let mut input = valid_input();
        input.url = None;
        assert!(matches!(
            submit_link(input, &deps).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_tags_fail() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps();

        let mut input = valid_input();
        input.tags = vec![];
        let err = submit_link(input, &deps).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("At least one tag"));
    }

    #[tokio::test]
    async fn test_unknown_tag_fails() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps();

        let mut input = valid_input();
        input.tags = vec!["code".to_string(), "crypto".to_string()];
        assert!(matches!(
            submit_link(input, &deps).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_bad_url_scheme_fails() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps();

        let mut input = valid_input();
        input.url = Some("ftp://example.com".to_string());
        let err = submit_link(input, &deps).await.unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[tokio::test]
    async fn test_anonymous_forces_from_name() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps();

        let mut input = valid_input();
        input.is_anonymous = true;
        input.from = Some("Ada".to_string());
        let receipt = submit_link(input, &deps).await.unwrap();

        let record = deps.links.get(receipt.link_id).await.unwrap().unwrap();
        assert_eq!(record.from_name, "Anonymous");
        assert!(record.is_anonymous);
    }

    #[tokio::test]
    async fn test_long_fields_are_capped() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps();

        let mut input = valid_input();
        input.from = Some("x".repeat(500));
        input.message = Some("y".repeat(2000));
        let receipt = submit_link(input, &deps).await.unwrap();

        let record = deps.links.get(receipt.link_id).await.unwrap().unwrap();
        assert_eq!(record.from_name.chars().count(), 100);
        assert_eq!(record.message.chars().count(), 500);
    }

    #[tokio::test]
    async fn test_verified_badge_requires_secret_and_named_submission() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps();

        // Correct password, named: verified.
        let mut input = valid_input();
        input.verify_password = Some("test-verify-secret".to_string());
        let receipt = submit_link(input, &deps).await.unwrap();
        let record = deps.links.get(receipt.link_id).await.unwrap().unwrap();
        assert!(record.is_verified);

        // Correct password, anonymous: not verified.
        let mut input = valid_input();
        input.verify_password = Some("test-verify-secret".to_string());
        input.is_anonymous = true;
        let receipt = submit_link(input, &deps).await.unwrap();
        let record = deps.links.get(receipt.link_id).await.unwrap().unwrap();
        assert!(!record.is_verified);

        // Wrong password: not verified.
        let mut input = valid_input();
        input.verify_password = Some("nope".to_string());
        let receipt = submit_link(input, &deps).await.unwrap();
        let record = deps.links.get(receipt.link_id).await.unwrap().unwrap();
        assert!(!record.is_verified);
    }

    #[tokio::test]
    async fn test_no_configured_secret_never_verifies() {
        let mut test_deps = TestDependencies::new();
        test_deps.verified_user_password = None;
        let deps = test_deps.server_deps();

        let mut input = valid_input();
        input.verify_password = Some("anything".to_string());
        let receipt = submit_link(input, &deps).await.unwrap();
        let record = deps.links.get(receipt.link_id).await.unwrap().unwrap();
        assert!(!record.is_verified);
    }

    #[tokio::test]
    async fn test_captcha_bot_verdict_rejects() {
        let mut test_deps = TestDependencies::new();
        test_deps.captcha = std::sync::Arc::new(MockCaptchaVerifier::rejecting());
        let deps = test_deps.server_deps();

        let mut input = valid_input();
        input.captcha_token = Some("token".to_string());
        let err = submit_link(input, &deps).await.unwrap_err();
        assert!(err.to_string().contains("CAPTCHA"));
    }

    #[tokio::test]
    async fn test_captcha_outage_is_swallowed() {
        let mut test_deps = TestDependencies::new();
        test_deps.captcha = std::sync::Arc::new(MockCaptchaVerifier::failing());
        let deps = test_deps.server_deps();

        let mut input = valid_input();
        input.captcha_token = Some("token".to_string());
        assert!(submit_link(input, &deps).await.is_ok());
    }

    #[tokio::test]
    async fn test_unsafe_content_rejects() {
        let mut test_deps = TestDependencies::new();
        test_deps.content_filter =
            std::sync::Arc::new(MockContentFilter::unsafe_with_reason("blocked term"));
        let deps = test_deps.server_deps();

        let err = submit_link(valid_input(), &deps).await.unwrap_err();
        assert!(err.to_string().contains("rejected"));
    }

    #[tokio::test]
    async fn test_filter_outage_is_swallowed() {
        let mut test_deps = TestDependencies::new();
        test_deps.content_filter = std::sync::Arc::new(MockContentFilter::failing());
        let deps = test_deps.server_deps();

        assert!(submit_link(valid_input(), &deps).await.is_ok());
    }

    #[tokio::test]
    async fn test_metadata_fetch_fills_preview() {
        let mut test_deps = TestDependencies::new();
        test_deps.metadata = std::sync::Arc::new(
            MockMetadataFetcher::new()
                .with_preview("Example Page", Some("https://example.com/og.png")),
        );
        let deps = test_deps.server_deps();

        let receipt = submit_link(valid_input(), &deps).await.unwrap();
        let record = deps.links.get(receipt.link_id).await.unwrap().unwrap();
        assert_eq!(record.meta_title, "Example Page");
        assert_eq!(record.meta_image.as_deref(), Some("https://example.com/og.png"));
    }

    #[tokio::test]
    async fn test_metadata_failure_degrades_to_url_title() {
        let mut test_deps = TestDependencies::new();
        test_deps.metadata = std::sync::Arc::new(MockMetadataFetcher::new().failing());
        let deps = test_deps.server_deps();

        let receipt = submit_link(valid_input(), &deps).await.unwrap();
        let record = deps.links.get(receipt.link_id).await.unwrap().unwrap();
        assert_eq!(record.meta_title, "https://example.com");
        assert!(record.meta_image.is_none());
    }

    #[tokio::test]
    async fn test_caller_supplied_metadata_wins() {
        let mut test_deps = TestDependencies::new();
        test_deps.metadata = std::sync::Arc::new(
            MockMetadataFetcher::new().with_preview("Fetched Title", None),
        );
        let deps = test_deps.server_deps();

        let mut input = valid_input();
        input.meta_title = Some("Client Title".to_string());
        input.meta_image = Some("https://example.com/client.png".to_string());
        let receipt = submit_link(input, &deps).await.unwrap();

        let record = deps.links.get(receipt.link_id).await.unwrap().unwrap();
        assert_eq!(record.meta_title, "Client Title");
        assert_eq!(
            record.meta_image.as_deref(),
            Some("https://example.com/client.png")
        );
        // The fetcher was never consulted.
        assert!(test_deps.metadata.fetch_calls().is_empty());
    }

    #[tokio::test]
    async fn test_submission_does_not_wait_for_scan_engine() {
        let mut test_deps = TestDependencies::new();
        test_deps.scanner = std::sync::Arc::new(MockSecurityScanner::new().stalled());
        let deps = test_deps.server_deps();

        // With a scanner that never resolves, the submission must still
        // return promptly with a pending status.
        let receipt = tokio::time::timeout(
            Duration::from_secs(1),
            submit_link(valid_input(), &deps),
        )
        .await
        .expect("submission must not block on the scan engine")
        .unwrap();

        assert_eq!(receipt.security_status, SecurityStatus::Pending);
    }
}
