//! PostgreSQL adapter for RecordStore

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::domain::entities::{payload_from_json, Record, RecordId, SourceId};
use crate::domain::ports::RecordStore;
use crate::entity::events;
use crate::error::DomainError;

/// PostgreSQL implementation of RecordStore
pub struct PostgresRecordStore {
    db: DatabaseConnection,
}

impl PostgresRecordStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn source_ids(sources: &[SourceId]) -> Vec<String> {
    sources.iter().map(|s| s.0.clone()).collect()
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn recent(
        &self,
        sources: &[SourceId],
        limit: usize,
    ) -> Result<Vec<Record>, DomainError> {
        if sources.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let results = events::Entity::find()
            .filter(events::Column::SourceId.is_in(source_ids(sources)))
            .order_by_desc(events::Column::CreatedAt)
            .order_by_desc(events::Column::Id)
            .limit(limit as u64)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn latest_created_at(
        &self,
        sources: &[SourceId],
    ) -> Result<Option<DateTime<Utc>>, DomainError> {
        if sources.is_empty() {
            return Ok(None);
        }

        let result = events::Entity::find()
            .filter(events::Column::SourceId.is_in(source_ids(sources)))
            .order_by_desc(events::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;

        Ok(result.map(|m| m.created_at.with_timezone(&Utc)))
    }
}

impl From<events::Model> for Record {
    fn from(model: events::Model) -> Self {
        Record {
            id: RecordId(model.id),
            source_id: SourceId(model.source_id),
            payload: payload_from_json(&model.payload),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
