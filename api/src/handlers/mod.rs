//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod feed;

pub use feed::{feed_status, get_feed, get_feed_without_secret};
