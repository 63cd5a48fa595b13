//! Data output API server
//!
//! Publishes the newest records of configured sources as secret-gated
//! RSS or JSON feeds. Uses hexagonal (ports & adapters) architecture:
//! records come from Postgres, feed definitions from a JSON document.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Json, Router};
use chrono::Utc;
use sea_orm::Database;
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod entity;
mod error;
mod feed;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::{JsonFileFeedRepository, PostgresRecordStore};
use app::FeedService;
use config::Config;
use domain::ports::{FeedRepository, RecordStore};

/// Application state shared across all handlers
pub struct AppState<FR, RS>
where
    FR: FeedRepository,
    RS: RecordStore,
{
    pub feed_service: Arc<FeedService<FR, RS>>,
}

impl<FR, RS> Clone for AppState<FR, RS>
where
    FR: FeedRepository,
    RS: RecordStore,
{
    fn clone(&self) -> Self {
        Self {
            feed_service: self.feed_service.clone(),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the router without rate limiting
pub fn router<FR, RS>(state: AppState<FR, RS>) -> Router
where
    FR: FeedRepository + 'static,
    RS: RecordStore + 'static,
{
    Router::new()
        // Health checks (no secret)
        .route("/health", get(health))
        .route("/health/feeds/:feed_id", get(handlers::feed_status::<FR, RS>))
        // Feeds (secret in path)
        .route("/feeds/:feed_id/:secret", get(handlers::get_feed::<FR, RS>))
        .route(
            "/feeds/:feed_id",
            get(handlers::get_feed_without_secret::<FR, RS>),
        )
        .route(
            "/feeds/:feed_id/",
            get(handlers::get_feed_without_secret::<FR, RS>),
        )
        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dataout_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting data output API...");

    // Load configuration
    let config = Config::from_env()?;

    // Connect to PostgreSQL
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Create adapters
    let record_store = Arc::new(PostgresRecordStore::new(db));
    let feed_repo = Arc::new(
        JsonFileFeedRepository::load(&config.feeds_path)
            .await
            .with_context(|| format!("Failed to load feeds from {}", config.feeds_path))?,
    );

    // Create application services
    let feed_service = Arc::new(FeedService::new(
        feed_repo,
        record_store,
        config.api_base_url.clone(),
    ));

    for feed in feed_service.list_feeds().await? {
        for url in feed_service.feed_urls(&feed) {
            tracing::debug!(feed_id = %feed.id, name = %feed.name, %url, "Serving feed");
        }
        match feed_service.is_working(&feed, Utc::now()).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(feed_id = %feed.id, name = %feed.name, "Feed has no recent records")
            }
            Err(e) => tracing::warn!(feed_id = %feed.id, error = %e, "Could not check feed"),
        }
    }

    let state = AppState { feed_service };

    // Rate limiting config: 2 req/sec sustained, burst of 5
    // Uses PeerIpKeyExtractor to get client IP from socket connection
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(2)
            .burst_size(5)
            .finish()
            .context("Failed to build governor config")?,
    );

    let app = router(state).layer(GovernorLayer {
        config: governor_config,
    });

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
