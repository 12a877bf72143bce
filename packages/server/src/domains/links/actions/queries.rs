//! Read-model queries: the public feed and the admin dashboard.
//!
//! The public surface only ever sees approved records, projected through
//! `PublicLink`. The admin surface is unfiltered and additionally supports
//! the dashboard's derived filters for triage.

use std::sync::Arc;

use crate::common::{AppError, AppResult, LinkId};
use crate::domains::links::models::{LinkRecord, LinkStatus, PublicLink, SecurityStatus};
use crate::domains::links::store::LinkStore;
use crate::kernel::ServerDeps;

/// Derived filters offered by the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdminFilter {
    #[default]
    All,
    /// At least one community report.
    Reported,
    /// Moderation status is flagged.
    Flagged,
    /// Needs security triage: scan came back suspicious/malicious, or the
    /// record sits in pending_review.
    Security,
    Verified,
    NotVerified,
}

impl std::str::FromStr for AdminFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "all" => Ok(AdminFilter::All),
            "reported" => Ok(AdminFilter::Reported),
            "flagged" => Ok(AdminFilter::Flagged),
            "security" => Ok(AdminFilter::Security),
            "verified" => Ok(AdminFilter::Verified),
            "notverified" => Ok(AdminFilter::NotVerified),
            _ => Err(anyhow::anyhow!("Invalid admin filter: {}", s)),
        }
    }
}

impl AdminFilter {
    fn matches(&self, record: &LinkRecord) -> bool {
        match self {
            AdminFilter::All => true,
            AdminFilter::Reported => record.report_count > 0,
            AdminFilter::Flagged => record.moderation() == LinkStatus::Flagged,
            AdminFilter::Security => {
                matches!(
                    record.security(),
                    SecurityStatus::Suspicious | SecurityStatus::Malicious
                ) || record.moderation() == LinkStatus::PendingReview
            }
            AdminFilter::Verified => record.is_verified,
            AdminFilter::NotVerified => !record.is_verified,
        }
    }
}

/// The public feed: approved records, newest first.
pub async fn public_list(deps: &Arc<ServerDeps>) -> AppResult<Vec<PublicLink>> {
    let records = deps
        .links
        .list_approved()
        .await
        .map_err(AppError::Internal)?;
    Ok(records.into_iter().map(PublicLink::from).collect())
}

/// Fetch one record for public display. A record that is missing and a
/// record that exists but is hidden produce the same `Unavailable` answer.
pub async fn public_get(link_id: LinkId, deps: &Arc<ServerDeps>) -> AppResult<PublicLink> {
    let record = deps
        .links
        .get(link_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::Unavailable)?;

    if !record.is_publicly_visible() {
        return Err(AppError::Unavailable);
    }

    Ok(PublicLink::from(record))
}

/// The admin view: every record, with optional dashboard filtering.
pub async fn admin_list(
    filter: AdminFilter,
    deps: &Arc<ServerDeps>,
) -> AppResult<Vec<LinkRecord>> {
    let records = deps.links.list_all().await.map_err(AppError::Internal)?;
    Ok(records
        .into_iter()
        .filter(|record| filter.matches(record))
        .collect())
}
