//! Scan result application.
//!
//! Applies a verdict from the scan engine to a record: idempotent for a
//! repeated verdict, last-write-wins for a different one, and never touches
//! the moderation status - operators act on verdicts, the pipeline does not.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::common::{AppError, AppResult, LinkId};
use crate::domains::links::models::ScanVerdict;
use crate::domains::links::store::LinkStore;
use crate::kernel::ServerDeps;

/// Apply a scan verdict and its detail payload to a record.
pub async fn apply_scan_result(
    link_id: LinkId,
    verdict: ScanVerdict,
    detail: JsonValue,
    deps: &Arc<ServerDeps>,
) -> AppResult<()> {
    let Some(record) = deps.links.get(link_id).await.map_err(AppError::Internal)? else {
        return Err(AppError::NotFound("Link"));
    };

    // Re-applying the verdict already on the record is a no-op.
    if record.security() == verdict.as_security_status() {
        debug!(link_id = %link_id, verdict = %verdict, "scan verdict already applied");
        return Ok(());
    }

    let applied = deps
        .links
        .apply_scan(link_id, verdict.as_security_status(), detail)
        .await
        .map_err(AppError::Internal)?;

    if !applied {
        // Deleted between the read above and the write.
        return Err(AppError::NotFound("Link"));
    }

    info!(link_id = %link_id, verdict = %verdict, "scan verdict applied");
    Ok(())
}
