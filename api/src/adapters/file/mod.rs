//! File adapters
//!
//! Feed definitions kept in a JSON document on disk.

pub mod feed_repo;

pub use feed_repo::JsonFileFeedRepository;
