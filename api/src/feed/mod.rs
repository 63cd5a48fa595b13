//! Feed module
//!
//! Builds one document model per render and serializes it as RSS or JSON.

pub mod document;
pub mod renderer;
pub mod template;

pub use document::{FeedDocument, FeedItem, OutputFormat};
pub use renderer::{build_document, render};
