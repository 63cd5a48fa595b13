//! Record window
//!
//! Read-only projection over the record store: the newest `limit` records of
//! a feed's sources. Calling it twice without new inserts yields the same
//! records in the same order.

use std::sync::Arc;

use crate::domain::entities::{Record, SourceId};
use crate::domain::ports::RecordStore;
use crate::error::DomainError;

pub struct RecordWindow<RS>
where
    RS: RecordStore,
{
    store: Arc<RS>,
}

impl<RS> RecordWindow<RS>
where
    RS: RecordStore,
{
    pub fn new(store: Arc<RS>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RS {
        &self.store
    }

    /// Newest-first records from `sources`, at most `limit`
    pub async fn fetch(
        &self,
        sources: &[SourceId],
        limit: usize,
    ) -> Result<Vec<Record>, DomainError> {
        if sources.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut records = self.store.recent(sources, limit).await?;

        // Only declared sources, newest first, ties by descending id
        records.retain(|record| sources.contains(&record.source_id));
        records.sort_by(|a, b| b.recency_key().cmp(&a.recency_key()));
        records.truncate(limit);

        Ok(records)
    }
}
