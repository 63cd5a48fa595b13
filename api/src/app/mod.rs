//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities, ports, and the feed renderer.

pub mod feed_service;
pub mod freshness;
pub mod record_window;

pub use feed_service::{FeedService, FeedStatus};
