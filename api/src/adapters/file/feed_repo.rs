//! JSON file adapter for FeedRepository
//!
//! The document is a JSON array of feed definitions. It is read once at
//! startup and served from memory; `save` writes the whole document back.

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::entities::{FeedConfig, FeedDefinition, FeedId};
use crate::domain::ports::FeedRepository;
use crate::error::{ConfigError, DomainError};

/// Feed repository backed by a JSON document
pub struct JsonFileFeedRepository {
    path: PathBuf,
    feeds: RwLock<Vec<FeedDefinition>>,
}

impl JsonFileFeedRepository {
    /// Read and validate the feeds document.
    ///
    /// Fails if any feed is invalid or two feeds share an id.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let text = tokio::fs::read_to_string(&path).await?;
        let feeds: Vec<FeedDefinition> = serde_json::from_str(&text)?;

        let mut seen = HashSet::new();
        for feed in &feeds {
            if !seen.insert(feed.id) {
                return Err(ConfigError::DuplicateFeed(feed.id.to_string()));
            }
            if let Err(e) = FeedConfig::from_definition(feed) {
                tracing::error!(feed_id = %feed.id, name = %feed.name, error = %e, "Invalid feed definition");
                return Err(e);
            }
        }

        tracing::info!(path = %path.display(), feeds = feeds.len(), "Loaded feed definitions");

        Ok(Self {
            path,
            feeds: RwLock::new(feeds),
        })
    }
}

#[async_trait]
impl FeedRepository for JsonFileFeedRepository {
    async fn find_by_id(&self, id: &FeedId) -> Result<Option<FeedDefinition>, DomainError> {
        let feeds = self.feeds.read().await;
        Ok(feeds.iter().find(|f| f.id == *id).cloned())
    }

    async fn list(&self) -> Result<Vec<FeedDefinition>, DomainError> {
        Ok(self.feeds.read().await.clone())
    }

    async fn save(&self, feed: &FeedDefinition) -> Result<(), DomainError> {
        let mut feeds = self.feeds.write().await;

        let mut updated = feeds.clone();
        match updated.iter_mut().find(|f| f.id == feed.id) {
            Some(existing) => *existing = feed.clone(),
            None => updated.push(feed.clone()),
        }

        let text = serde_json::to_string_pretty(&updated)
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        tokio::fs::write(&self.path, text)
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;

        // Memory only changes once the file has been written
        *feeds = updated;
        Ok(())
    }
}
