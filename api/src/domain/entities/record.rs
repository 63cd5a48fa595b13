//! Record domain entity
//!
//! Records are produced upstream and only ever read here.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::feed::SourceId;

/// Flat key/value payload used for template substitution
pub type Payload = BTreeMap<String, String>;

/// Unique identifier for a record, assigned in insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record emitted by an upstream source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: RecordId,
    pub source_id: SourceId,
    pub payload: Payload,
    pub created_at: DateTime<Utc>,
}

impl Record {
    /// Ordering key: later `created_at` is newer, ties go to the higher id
    pub fn recency_key(&self) -> (DateTime<Utc>, RecordId) {
        (self.created_at, self.id)
    }
}

/// Flatten a stored JSON payload into string values.
///
/// Strings are taken verbatim, other scalars use their JSON text, nested
/// arrays and objects become compact JSON. Non-object payloads are empty.
pub fn payload_from_json(value: &Value) -> Payload {
    let Value::Object(map) = value else {
        return Payload::new();
    };

    map.iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), text))
        })
        .collect()
}
