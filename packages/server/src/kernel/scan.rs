//! Fire-and-forget scan dispatch.
//!
//! The submission path calls [`dispatch_scan`] and returns immediately; the
//! scan runs in a detached task and lands its verdict through the store
//! whenever it completes. A scan that fails, never completes, or finds its
//! record deleted leaves no trace beyond a log line.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use super::deps::ServerDeps;
use super::traits::{BaseSecurityScanner, ScanOutcome};
use crate::common::{AppError, LinkId};
use crate::domains::links::actions;

/// Schedule a security scan for a freshly created record. Never blocks and
/// never fails the caller; the task owns the whole scan-then-apply flow.
pub fn dispatch_scan(deps: &Arc<ServerDeps>, link_id: LinkId, url: String) {
    let deps = Arc::clone(deps);
    tokio::spawn(async move {
        let outcome = match deps.scanner.scan(&url).await {
            Ok(outcome) => outcome,
            Err(error) => {
                // The record keeps security_status = pending indefinitely.
                warn!(link_id = %link_id, error = %error, "security scan failed");
                return;
            }
        };

        match actions::scan::apply_scan_result(link_id, outcome.verdict, outcome.detail, &deps)
            .await
        {
            Ok(()) => {}
            Err(AppError::NotFound(_)) => {
                // Deleted by an admin while the scan was in flight.
                debug!(link_id = %link_id, "link gone before scan completed");
            }
            Err(error) => {
                warn!(link_id = %link_id, error = %error, "failed to apply scan result");
            }
        }
    });
}

/// Scanner used when no scan engine is configured. Every record it touches
/// stays `pending`, which the read model renders as "still scanning".
pub struct NoopScanner;

#[async_trait]
impl BaseSecurityScanner for NoopScanner {
    async fn scan(&self, _url: &str) -> Result<ScanOutcome> {
        anyhow::bail!("no security scan engine configured")
    }
}
