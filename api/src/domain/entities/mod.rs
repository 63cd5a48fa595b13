//! Domain entities
//!
//! Pure domain models for feeds and the records they publish.
//! These are separate from the SeaORM entities in the `entity` module.

pub mod feed;
pub mod record;

pub use feed::{
    FeedConfig, FeedDefinition, FeedId, FeedTemplate, ItemTemplate, SourceId, DEFAULT_TTL_MINUTES,
};
pub use record::{payload_from_json, Payload, Record, RecordId};
