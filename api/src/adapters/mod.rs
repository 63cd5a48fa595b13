//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod file;
pub mod postgres;

pub use file::JsonFileFeedRepository;
pub use postgres::PostgresRecordStore;
