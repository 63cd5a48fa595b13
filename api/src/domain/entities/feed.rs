//! Feed domain entity
//!
//! A feed publishes the most recent records of a set of upstream sources.
//! Operators store a `FeedDefinition` with a free-form options document;
//! `FeedConfig` is the validated, typed view the rendering path reads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::domain::validation::parse_options;
use crate::error::ConfigError;

/// Records shown when the options leave `events_to_show` out
pub const DEFAULT_EVENTS_TO_SHOW: usize = 40;

/// Receive period used by the default options document
pub const DEFAULT_EXPECTED_RECEIVE_PERIOD_IN_DAYS: u64 = 2;

/// Channel time-to-live, in minutes
pub const DEFAULT_TTL_MINUTES: u32 = 60;

/// Unique identifier for a feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedId(pub Uuid);

impl FeedId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FeedId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for FeedId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for FeedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an upstream producer whose records a feed may publish
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(pub String);

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A feed as the operator stores it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedDefinition {
    pub id: FeedId,
    pub name: String,
    #[serde(default)]
    pub sources: Vec<SourceId>,
    /// Secrets, timing and template, validated before use
    #[serde(default = "FeedConfig::default_options")]
    pub options: Value,
}

/// Validated feed configuration
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    pub id: FeedId,
    pub name: String,
    pub secrets: Vec<String>,
    pub expected_receive_period_in_days: u64,
    pub events_to_show: usize,
    pub template: FeedTemplate,
    pub sources: Vec<SourceId>,
}

impl FeedConfig {
    /// Validate a stored definition and build the typed configuration.
    ///
    /// Every rule is checked; the error carries all failures, not just the first.
    pub fn from_definition(definition: &FeedDefinition) -> Result<Self, ConfigError> {
        let options = parse_options(&definition.options).map_err(ConfigError::Invalid)?;

        Ok(Self {
            id: definition.id,
            name: definition.name.clone(),
            secrets: options.secrets,
            expected_receive_period_in_days: options.expected_receive_period_in_days,
            events_to_show: options.events_to_show,
            template: options.template,
            sources: definition.sources.clone(),
        })
    }

    /// Options document a new feed starts from.
    ///
    /// The secrets list is empty, so the defaults alone never validate.
    pub fn default_options() -> Value {
        json!({
            "secrets": [],
            "expected_receive_period_in_days": DEFAULT_EXPECTED_RECEIVE_PERIOD_IN_DAYS,
            "template": {
                "title": "XKCD comics as a feed",
                "description": "This is a feed of recent XKCD comics",
                "item": {
                    "title": "{{title}}",
                    "description": "Secret hovertext: {{hovertext}}",
                    "link": "{{url}}"
                }
            }
        })
    }
}

/// Channel-level template
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedTemplate {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Overrides the host's base URL as the channel link
    pub link: Option<String>,
    pub ttl: Option<u32>,
    /// Unrecognized top-level keys, merged into structured output
    pub extra: BTreeMap<String, Value>,
    pub item: ItemTemplate,
}

/// Per-record template
///
/// Reserved fields are interpreted; everything else lands in `extra` and is
/// copied into each item after placeholder substitution.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemTemplate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub extra: BTreeMap<String, Value>,
}
