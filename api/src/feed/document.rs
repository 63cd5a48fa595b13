//! Feed document model
//!
//! Both wire formats serialize this model; neither computes anything of its own.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::entities::RecordId;

/// Wire format, chosen once per request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// RSS 2.0
    Syndication,
    /// JSON
    Structured,
}

impl OutputFormat {
    /// Pick a format from an `Accept` or `Content-Type` hint.
    ///
    /// Any JSON media type selects `Structured`; everything else, including
    /// no hint at all, selects `Syndication`.
    pub fn from_media_type(hint: Option<&str>) -> Self {
        match hint {
            Some(value) if value.to_ascii_lowercase().contains("json") => Self::Structured,
            _ => Self::Syndication,
        }
    }

    /// Format named by a path extension such as `xml` or `json`
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "xml" | "rss" => Some(Self::Syndication),
            "json" => Some(Self::Structured),
            _ => None,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Syndication => "text/xml",
            Self::Structured => "application/json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Syndication => write!(f, "syndication"),
            OutputFormat::Structured => write!(f, "structured"),
        }
    }
}

/// A rendered feed
#[derive(Debug, Clone, PartialEq)]
pub struct FeedDocument {
    pub title: String,
    pub description: String,
    pub link: String,
    /// Render time; both the build date and the publish date
    pub built_at: DateTime<Utc>,
    /// Minutes
    pub ttl: u32,
    /// Newest first
    pub items: Vec<FeedItem>,
    /// Free-form channel metadata from the template
    pub extra: BTreeMap<String, Value>,
}

/// One rendered record
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub title: String,
    pub description: String,
    pub link: String,
    pub guid: RecordId,
    pub published_at: DateTime<Utc>,
    /// Custom per-item fields, after substitution
    pub extra: BTreeMap<String, Value>,
}
