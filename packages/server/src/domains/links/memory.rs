//! In-memory link store.
//!
//! Backs the unit test suite and the database-free development mode. The
//! map mutex is held across each whole operation, which gives every method
//! the same per-record atomicity the SQL statements provide.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;

use super::models::{LinkRecord, LinkStatus, LinkUpdate, NewLink, SecurityStatus};
use super::store::{LinkStore, ReportOutcome};
use crate::common::LinkId;

#[derive(Default)]
pub struct MemoryLinkStore {
    records: Mutex<HashMap<LinkId, LinkRecord>>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut records: Vec<LinkRecord>) -> Vec<LinkRecord> {
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        records
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn create(&self, new: NewLink) -> Result<LinkRecord> {
        let now = Utc::now();
        let record = LinkRecord {
            id: LinkId::new(),
            from_name: new.from_name,
            message: new.message,
            url: new.url,
            tags: new.tags,
            is_anonymous: new.is_anonymous,
            is_verified: new.is_verified,
            status: LinkStatus::Approved.to_string(),
            security_status: SecurityStatus::Pending.to_string(),
            security_scan: None,
            report_count: 0,
            reported_by: vec![],
            meta_title: new.meta_title,
            meta_image: new.meta_image,
            created_at: now,
            updated_at: now,
        };

        let mut records = self.records.lock().unwrap();
        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: LinkId) -> Result<Option<LinkRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<LinkRecord>> {
        let records = self.records.lock().unwrap();
        Ok(Self::sorted(records.values().cloned().collect()))
    }

    async fn list_approved(&self) -> Result<Vec<LinkRecord>> {
        let records = self.records.lock().unwrap();
        Ok(Self::sorted(
            records
                .values()
                .filter(|r| r.is_publicly_visible())
                .cloned()
                .collect(),
        ))
    }

    async fn update_fields(&self, id: LinkId, update: LinkUpdate) -> Result<bool> {
        let mut records = self.records.lock().unwrap();
        let Some(record) = records.get_mut(&id) else {
            return Ok(false);
        };

        if let Some(from_name) = update.from_name {
            record.from_name = from_name;
        }
        if let Some(message) = update.message {
            record.message = message;
        }
        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(url) = update.url {
            record.url = url;
        }
        if let Some(tags) = update.tags {
            record.tags = tags;
        }
        if let Some(is_verified) = update.is_verified {
            record.is_verified = is_verified;
        }
        record.updated_at = Utc::now();
        Ok(true)
    }

    async fn apply_scan(
        &self,
        id: LinkId,
        status: SecurityStatus,
        detail: JsonValue,
    ) -> Result<bool> {
        let mut records = self.records.lock().unwrap();
        let Some(record) = records.get_mut(&id) else {
            return Ok(false);
        };
        record.security_status = status.to_string();
        record.security_scan = Some(detail);
        record.updated_at = Utc::now();
        Ok(true)
    }

    async fn add_report(&self, id: LinkId, reporter: &str) -> Result<ReportOutcome> {
        let mut records = self.records.lock().unwrap();
        let Some(record) = records.get_mut(&id) else {
            return Ok(ReportOutcome::NotFound);
        };

        if record.reported_by.iter().any(|r| r == reporter) {
            return Ok(ReportOutcome::Duplicate(record.report_count));
        }

        record.reported_by.push(reporter.to_string());
        record.report_count += 1;
        record.updated_at = Utc::now();
        Ok(ReportOutcome::Added(record.report_count))
    }

    async fn delete(&self, id: LinkId) -> Result<bool> {
        let mut records = self.records.lock().unwrap();
        Ok(records.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::links::models::NewLink;

    fn sample(url: &str) -> NewLink {
        NewLink::builder()
            .from_name("Ada")
            .message("a message")
            .url(url)
            .tags(vec!["code".to_string()])
            .meta_title(url)
            .build()
    }

    #[tokio::test]
    async fn test_create_assigns_defaults() {
        let store = MemoryLinkStore::new();
        let record = store.create(sample("https://example.com")).await.unwrap();
        assert_eq!(record.status, "approved");
        assert_eq!(record.security_status, "pending");
        assert!(record.security_scan.is_none());
        assert_eq!(record.report_count, 0);
        assert!(record.reported_by.is_empty());
    }

    #[tokio::test]
    async fn test_list_all_orders_newest_first() {
        let store = MemoryLinkStore::new();
        let first = store.create(sample("https://a.example")).await.unwrap();
        let second = store.create(sample("https://b.example")).await.unwrap();

        let listed = store.list_all().await.unwrap();
        assert_eq!(listed.len(), 2);
        // v7 ids break created_at ties deterministically, so the second
        // record always leads even when timestamps collide.
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_list_approved_excludes_hidden_statuses() {
        let store = MemoryLinkStore::new();
        let visible = store.create(sample("https://ok.example")).await.unwrap();
        let hidden = store.create(sample("https://bad.example")).await.unwrap();
        store
            .update_fields(
                hidden.id,
                LinkUpdate {
                    status: Some("flagged".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let listed = store.list_approved().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, visible.id);
    }

    #[tokio::test]
    async fn test_add_report_deduplicates_reporter() {
        let store = MemoryLinkStore::new();
        let record = store.create(sample("https://example.com")).await.unwrap();

        assert_eq!(
            store.add_report(record.id, "reporter_1").await.unwrap(),
            ReportOutcome::Added(1)
        );
        assert_eq!(
            store.add_report(record.id, "reporter_1").await.unwrap(),
            ReportOutcome::Duplicate(1)
        );
        assert_eq!(
            store.add_report(record.id, "reporter_2").await.unwrap(),
            ReportOutcome::Added(2)
        );

        let stored = store.get(record.id).await.unwrap().unwrap();
        assert_eq!(stored.report_count, 2);
        assert_eq!(stored.report_count as usize, stored.reported_by.len());
    }

    #[tokio::test]
    async fn test_add_report_missing_link() {
        let store = MemoryLinkStore::new();
        assert_eq!(
            store.add_report(LinkId::new(), "reporter_1").await.unwrap(),
            ReportOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_concurrent_same_reporter_counts_once() {
        use std::sync::Arc;

        let store = Arc::new(MemoryLinkStore::new());
        let record = store.create(sample("https://example.com")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            let id = record.id;
            handles.push(tokio::spawn(async move {
                store.add_report(id, "reporter_1").await.unwrap()
            }));
        }

        let mut added = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), ReportOutcome::Added(_)) {
                added += 1;
            }
        }
        assert_eq!(added, 1);
        assert_eq!(
            store.get(record.id).await.unwrap().unwrap().report_count,
            1
        );
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let store = MemoryLinkStore::new();
        let record = store.create(sample("https://example.com")).await.unwrap();
        assert!(store.delete(record.id).await.unwrap());
        assert!(!store.delete(record.id).await.unwrap());
        assert!(store.get(record.id).await.unwrap().is_none());
    }
}
