//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL, a JSON file).

use async_trait::async_trait;

use chrono::{DateTime, Utc};

use crate::domain::entities::{FeedDefinition, FeedId, Record, SourceId};
use crate::error::DomainError;

/// Read-only access to records produced upstream
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Most recent records emitted by any of `sources`, at most `limit`.
    ///
    /// Ordered newest first by `created_at`, equal timestamps by descending id.
    async fn recent(&self, sources: &[SourceId], limit: usize)
        -> Result<Vec<Record>, DomainError>;

    /// Creation time of the newest record emitted by any of `sources`
    async fn latest_created_at(
        &self,
        sources: &[SourceId],
    ) -> Result<Option<DateTime<Utc>>, DomainError>;
}

/// Repository for feed definitions
#[async_trait]
pub trait FeedRepository: Send + Sync {
    /// Find a feed by ID
    async fn find_by_id(&self, id: &FeedId) -> Result<Option<FeedDefinition>, DomainError>;

    /// All stored feeds
    async fn list(&self) -> Result<Vec<FeedDefinition>, DomainError>;

    /// Insert or replace a feed. Callers validate before saving.
    async fn save(&self, feed: &FeedDefinition) -> Result<(), DomainError>;
}
