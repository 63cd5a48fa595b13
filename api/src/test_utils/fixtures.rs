//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::domain::entities::{FeedDefinition, FeedId, Payload, Record, RecordId, SourceId};

/// Options for a comic feed with two secrets and a two-record window
pub fn test_feed_options() -> Value {
    json!({
        "secrets": ["secret1", "secret2"],
        "expected_receive_period_in_days": 2,
        "events_to_show": 2,
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

/// Create a test feed reading from the `website` source
pub fn test_feed_definition() -> FeedDefinition {
    FeedDefinition {
        id: FeedId::new(),
        name: "XKCD".to_string(),
        sources: vec![SourceId::from("website")],
        options: test_feed_options(),
    }
}

/// Create a record with an empty payload
pub fn test_record(id: i64, source: &str, created_at: DateTime<Utc>) -> Record {
    Record {
        id: RecordId(id),
        source_id: SourceId::from(source),
        payload: Payload::new(),
        created_at,
    }
}

/// Create a comic record from the `website` source
pub fn xkcd_record(id: i64, title: &str, hovertext: &str, created_at: DateTime<Utc>) -> Record {
    let slug = title.to_lowercase().replace(' ', "_");
    Record {
        id: RecordId(id),
        source_id: SourceId::from("website"),
        payload: Payload::from([
            ("title".to_string(), title.to_string()),
            ("hovertext".to_string(), hovertext.to_string()),
            (
                "url".to_string(),
                format!("http://imgs.xkcd.com/comics/{}.png", slug),
            ),
        ]),
        created_at,
    }
}
