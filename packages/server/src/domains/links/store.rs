//! Link persistence port and its PostgreSQL implementation.
//!
//! The trait is the seam that lets actions run against either the database
//! or the in-memory store in `memory.rs`. Every method is atomic per record;
//! `add_report` is the one operation that folds a membership check and an
//! increment into a single statement.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use super::models::{LinkRecord, LinkUpdate, NewLink, SecurityStatus};
use crate::common::LinkId;

/// Result of counting a community report, handling reporter dedup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The report counted; carries the new total.
    Added(i32),
    /// This reporter already counted against this link; carries the
    /// unchanged total.
    Duplicate(i32),
    /// The link does not exist.
    NotFound,
}

/// Data persistence contract for link records.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Persist a new record with default lifecycle state
    /// (approved, scan pending, zero reports).
    async fn create(&self, new: NewLink) -> Result<LinkRecord>;

    async fn get(&self, id: LinkId) -> Result<Option<LinkRecord>>;

    /// Every record, newest first (ties broken by id).
    async fn list_all(&self) -> Result<Vec<LinkRecord>>;

    /// Publicly visible records only, same ordering.
    async fn list_approved(&self) -> Result<Vec<LinkRecord>>;

    /// Apply the administrative field group. Returns false on a missing id.
    async fn update_fields(&self, id: LinkId, update: LinkUpdate) -> Result<bool>;

    /// Overwrite the scan field group (last write wins). Returns false on a
    /// missing id.
    async fn apply_scan(
        &self,
        id: LinkId,
        status: SecurityStatus,
        detail: JsonValue,
    ) -> Result<bool>;

    /// Count a report from `reporter` at most once per (link, reporter).
    /// The check-then-increment must not lose updates under concurrent
    /// identical-reporter calls.
    async fn add_report(&self, id: LinkId, reporter: &str) -> Result<ReportOutcome>;

    /// Hard removal. Returns false when the record was already gone.
    async fn delete(&self, id: LinkId) -> Result<bool>;
}

/// PostgreSQL-backed link store.
pub struct PostgresLinkStore {
    pool: PgPool,
}

impl PostgresLinkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkStore for PostgresLinkStore {
    async fn create(&self, new: NewLink) -> Result<LinkRecord> {
        LinkRecord::insert(&new, &self.pool).await
    }

    async fn get(&self, id: LinkId) -> Result<Option<LinkRecord>> {
        LinkRecord::find_by_id(id, &self.pool).await
    }

    async fn list_all(&self) -> Result<Vec<LinkRecord>> {
        LinkRecord::list_all(&self.pool).await
    }

    async fn list_approved(&self) -> Result<Vec<LinkRecord>> {
        LinkRecord::list_approved(&self.pool).await
    }

    async fn update_fields(&self, id: LinkId, update: LinkUpdate) -> Result<bool> {
        LinkRecord::update_fields(id, &update, &self.pool).await
    }

    async fn apply_scan(
        &self,
        id: LinkId,
        status: SecurityStatus,
        detail: JsonValue,
    ) -> Result<bool> {
        LinkRecord::apply_scan(id, &status.to_string(), &detail, &self.pool).await
    }

    async fn add_report(&self, id: LinkId, reporter: &str) -> Result<ReportOutcome> {
        // The conditional UPDATE settles Added atomically; a miss is either a
        // duplicate reporter or a missing row, told apart by a follow-up read.
        if let Some(count) = LinkRecord::record_report(id, reporter, &self.pool).await? {
            return Ok(ReportOutcome::Added(count));
        }

        match LinkRecord::find_by_id(id, &self.pool).await? {
            Some(record) => Ok(ReportOutcome::Duplicate(record.report_count)),
            None => Ok(ReportOutcome::NotFound),
        }
    }

    async fn delete(&self, id: LinkId) -> Result<bool> {
        LinkRecord::delete(id, &self.pool).await
    }
}
