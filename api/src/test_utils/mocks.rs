//! Mock implementations of port traits
//!
//! In-memory implementations that can be configured for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::entities::{FeedDefinition, FeedId, Record, SourceId};
use crate::domain::ports::{FeedRepository, RecordStore};
use crate::error::DomainError;

// ============================================================================
// In-Memory Record Store
// ============================================================================

#[derive(Default)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<Vec<Record>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a record for testing
    pub fn with_record(self, record: Record) -> Self {
        self.insert(record);
        self
    }

    pub fn insert(&self, record: Record) {
        self.records.write().unwrap().push(record);
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn recent(
        &self,
        sources: &[SourceId],
        limit: usize,
    ) -> Result<Vec<Record>, DomainError> {
        let records = self.records.read().unwrap();
        let mut matching: Vec<Record> = records
            .iter()
            .filter(|r| sources.contains(&r.source_id))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.recency_key().cmp(&a.recency_key()));
        matching.truncate(limit);
        Ok(matching)
    }

    async fn latest_created_at(
        &self,
        sources: &[SourceId],
    ) -> Result<Option<DateTime<Utc>>, DomainError> {
        let records = self.records.read().unwrap();
        Ok(records
            .iter()
            .filter(|r| sources.contains(&r.source_id))
            .map(|r| r.created_at)
            .max())
    }
}

// ============================================================================
// Failing Record Store
// ============================================================================

/// Record store whose every call fails, for error-path tests
pub struct FailingRecordStore;

#[async_trait]
impl RecordStore for FailingRecordStore {
    async fn recent(
        &self,
        _sources: &[SourceId],
        _limit: usize,
    ) -> Result<Vec<Record>, DomainError> {
        Err(DomainError::Storage("connection refused".to_string()))
    }

    async fn latest_created_at(
        &self,
        _sources: &[SourceId],
    ) -> Result<Option<DateTime<Utc>>, DomainError> {
        Err(DomainError::Storage("connection refused".to_string()))
    }
}

// ============================================================================
// In-Memory Feed Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryFeedRepository {
    feeds: Arc<RwLock<HashMap<FeedId, FeedDefinition>>>,
}

impl InMemoryFeedRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a feed for testing
    pub fn with_feed(self, feed: FeedDefinition) -> Self {
        self.feeds.write().unwrap().insert(feed.id, feed);
        self
    }
}

#[async_trait]
impl FeedRepository for InMemoryFeedRepository {
    async fn find_by_id(&self, id: &FeedId) -> Result<Option<FeedDefinition>, DomainError> {
        let feeds = self.feeds.read().unwrap();
        Ok(feeds.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<FeedDefinition>, DomainError> {
        let feeds = self.feeds.read().unwrap();
        let mut all: Vec<FeedDefinition> = feeds.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn save(&self, feed: &FeedDefinition) -> Result<(), DomainError> {
        self.feeds.write().unwrap().insert(feed.id, feed.clone());
        Ok(())
    }
}
