//! Community report action.
//!
//! Counts at most one report per (link, reporter) pair. A duplicate is a
//! normal outcome, not an error; the store folds the dedup check and the
//! increment into one atomic operation. The reporter identity is a
//! client-held pseudo-identity: good enough to stop casual double-reporting,
//! no defense against someone clearing their storage - a documented
//! trade-off of account-free reporting.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::common::{AppError, AppResult, LinkId};
use crate::domains::links::store::{LinkStore, ReportOutcome};
use crate::kernel::ServerDeps;

/// Report acknowledgment.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ReportReceipt {
    /// First report from this reporter; the count moved.
    #[serde(rename_all = "camelCase")]
    Accepted { success: bool, report_count: i32 },
    /// This reporter already counted against this link.
    #[serde(rename_all = "camelCase")]
    AlreadyReported {
        already_reported: bool,
        report_count: i32,
    },
}

/// Report a link for moderation (public - no auth required).
pub async fn report_link(
    link_id: LinkId,
    reporter_id: &str,
    reason: &str,
    deps: &Arc<ServerDeps>,
) -> AppResult<ReportReceipt> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(AppError::Validation("Report reason is required".into()));
    }
    let reporter_id = reporter_id.trim();
    if reporter_id.is_empty() {
        return Err(AppError::Validation("Reporter ID is required".into()));
    }

    match deps
        .links
        .add_report(link_id, reporter_id)
        .await
        .map_err(AppError::Internal)?
    {
        ReportOutcome::Added(report_count) => {
            // The reason lives in the operator log, not on the record.
            info!(
                link_id = %link_id,
                report_count,
                reason = %reason,
                "link reported"
            );
            Ok(ReportReceipt::Accepted {
                success: true,
                report_count,
            })
        }
        ReportOutcome::Duplicate(report_count) => Ok(ReportReceipt::AlreadyReported {
            already_reported: true,
            report_count,
        }),
        ReportOutcome::NotFound => Err(AppError::NotFound("Link")),
    }
}
