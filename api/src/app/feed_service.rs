//! Feed service
//!
//! Serves a feed to a reader holding one of its secrets, and reports whether
//! the feed's sources are still producing. Nothing here mutates shared state
//! on the read path, so requests run in parallel without coordination.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::freshness::is_fresh;
use crate::app::record_window::RecordWindow;
use crate::auth::authorize;
use crate::domain::entities::{FeedConfig, FeedDefinition, FeedId};
use crate::domain::ports::{FeedRepository, RecordStore};
use crate::error::{AppError, RenderError};
use crate::feed::{build_document, render, FeedDocument, OutputFormat};

/// Liveness report for one feed
#[derive(Debug, Clone, Serialize)]
pub struct FeedStatus {
    pub feed_id: FeedId,
    pub name: String,
    pub working: bool,
    pub last_received_at: Option<DateTime<Utc>>,
    pub expected_receive_period_in_days: u64,
}

/// Service for rendering feeds
pub struct FeedService<FR, RS>
where
    FR: FeedRepository,
    RS: RecordStore,
{
    feeds: Arc<FR>,
    window: RecordWindow<RS>,
    base_url: String,
}

impl<FR, RS> FeedService<FR, RS>
where
    FR: FeedRepository,
    RS: RecordStore,
{
    pub fn new(feeds: Arc<FR>, records: Arc<RS>, base_url: String) -> Self {
        Self {
            feeds,
            window: RecordWindow::new(records),
            base_url,
        }
    }

    /// Load a stored feed.
    ///
    /// Stored feeds were validated on save; one that no longer validates is
    /// a render error and is never served.
    pub async fn find_feed(&self, id: &FeedId) -> Result<Option<FeedConfig>, AppError> {
        let Some(definition) = self.feeds.find_by_id(id).await? else {
            return Ok(None);
        };

        let config = FeedConfig::from_definition(&definition).map_err(|e| {
            RenderError::MalformedTemplate {
                feed: id.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Some(config))
    }

    /// All stored feeds that validate; invalid ones are logged and skipped
    pub async fn list_feeds(&self) -> Result<Vec<FeedConfig>, AppError> {
        let definitions = self.feeds.list().await?;

        Ok(definitions
            .iter()
            .filter_map(|definition| match FeedConfig::from_definition(definition) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::error!(feed_id = %definition.id, error = %e, "Skipping invalid feed");
                    None
                }
            })
            .collect())
    }

    /// Handle a feed request.
    ///
    /// The secret is checked before any record is read. Unauthorized requests
    /// end there, with an error carrying the negotiated format.
    pub async fn serve(
        &self,
        id: &FeedId,
        supplied_secret: &str,
        format: OutputFormat,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let feed = self
            .find_feed(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Feed {} not found", id)))?;

        if !authorize(&feed.secrets, supplied_secret) {
            tracing::debug!(feed_id = %id, %format, "Rejected feed request");
            return Err(AppError::Unauthorized(format));
        }

        let document = self.render_document(&feed, now).await?;
        let body = render(&document, format)?;

        tracing::debug!(feed_id = %id, %format, items = document.items.len(), "Rendered feed");
        Ok(body)
    }

    /// Build the document for a feed's current record window
    pub async fn render_document(
        &self,
        feed: &FeedConfig,
        now: DateTime<Utc>,
    ) -> Result<FeedDocument, AppError> {
        let records = self
            .window
            .fetch(&feed.sources, feed.events_to_show)
            .await?;

        Ok(build_document(&feed.template, &records, &self.base_url, now))
    }

    /// Whether the feed's sources produced a record within the expected period
    pub async fn is_working(&self, feed: &FeedConfig, now: DateTime<Utc>) -> Result<bool, AppError> {
        Ok(self.report(feed, now).await?.working)
    }

    /// Liveness report for a stored feed
    pub async fn status(&self, id: &FeedId, now: DateTime<Utc>) -> Result<FeedStatus, AppError> {
        let feed = self
            .find_feed(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Feed {} not found", id)))?;

        self.report(&feed, now).await
    }

    async fn report(&self, feed: &FeedConfig, now: DateTime<Utc>) -> Result<FeedStatus, AppError> {
        let last_received_at = if feed.sources.is_empty() {
            None
        } else {
            self.window.store().latest_created_at(&feed.sources).await?
        };

        Ok(FeedStatus {
            feed_id: feed.id,
            name: feed.name.clone(),
            working: is_fresh(last_received_at, feed.expected_receive_period_in_days, now),
            last_received_at,
            expected_receive_period_in_days: feed.expected_receive_period_in_days,
        })
    }

    /// Public URLs of a feed, one per secret
    pub fn feed_urls(&self, feed: &FeedConfig) -> Vec<String> {
        let base = self.base_url.trim_end_matches('/');
        feed.secrets
            .iter()
            .map(|secret| {
                format!(
                    "{}/feeds/{}/{}.xml",
                    base,
                    feed.id,
                    urlencoding::encode(secret)
                )
            })
            .collect()
    }

    /// Validate and store a feed. Invalid definitions are never persisted.
    pub async fn save_feed(&self, definition: FeedDefinition) -> Result<FeedConfig, AppError> {
        let config = match FeedConfig::from_definition(&definition) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(feed_id = %definition.id, error = %e, "Rejected feed options");
                return Err(e.into());
            }
        };

        self.feeds.save(&definition).await?;
        tracing::info!(feed_id = %config.id, name = %config.name, "Saved feed");

        Ok(config)
    }
}
