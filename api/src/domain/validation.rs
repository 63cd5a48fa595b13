//! Feed options validation
//!
//! The options document is free-form JSON edited by an operator. Every rule
//! is independent and all of them run, so one save attempt reports every
//! problem at once. Nothing here has side effects.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::entities::feed::{FeedTemplate, ItemTemplate, DEFAULT_EVENTS_TO_SHOW};

/// Channel keys with a fixed meaning; never copied into `FeedTemplate::extra`
const RESERVED_FEED_KEYS: &[&str] = &[
    "title",
    "description",
    "link",
    "ttl",
    "item",
    "items",
    "pubDate",
    "lastBuildDate",
];

/// Item keys with a fixed meaning. `guid` and `pubDate` always come from the record.
const RESERVED_ITEM_KEYS: &[&str] = &["title", "description", "link", "guid", "pubDate"];

/// A single rule violation, tied to the option it concerns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub field: &'static str,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Typed result of a successful validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOptions {
    pub secrets: Vec<String>,
    pub expected_receive_period_in_days: u64,
    pub events_to_show: usize,
    pub template: FeedTemplate,
}

/// Check an options document, returning every failure (empty = valid)
pub fn validate_options(options: &Value) -> Vec<ValidationFailure> {
    parse_options(options).err().unwrap_or_default()
}

/// Check an options document and build its typed form
pub fn parse_options(options: &Value) -> Result<ValidatedOptions, Vec<ValidationFailure>> {
    let secrets = parse_secrets(options.get("secrets"));
    let period = parse_positive(
        "expected_receive_period_in_days",
        options.get("expected_receive_period_in_days"),
    );
    let events_to_show = match options.get("events_to_show") {
        None | Some(Value::Null) => Ok(DEFAULT_EVENTS_TO_SHOW),
        Some(value) => parse_positive("events_to_show", Some(value))
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX)),
    };
    let template = parse_template(options.get("template"));

    match (secrets, period, events_to_show, template) {
        (Ok(secrets), Ok(period), Ok(events_to_show), Ok(template)) => Ok(ValidatedOptions {
            secrets,
            expected_receive_period_in_days: period,
            events_to_show,
            template,
        }),
        (secrets, period, events_to_show, template) => Err([
            secrets.err(),
            period.err(),
            events_to_show.err(),
            template.err(),
        ]
        .into_iter()
        .flatten()
        .collect()),
    }
}

/// `secrets` must be a non-empty list of non-empty strings.
/// A bare string is rejected even when it is non-empty.
fn parse_secrets(value: Option<&Value>) -> Result<Vec<String>, ValidationFailure> {
    let failure = || {
        ValidationFailure::new(
            "secrets",
            "Please specify one or more secrets for authenticating incoming feed requests",
        )
    };

    let Some(Value::Array(entries)) = value else {
        return Err(failure());
    };
    if entries.is_empty() {
        return Err(failure());
    }

    entries
        .iter()
        .map(|entry| match entry {
            Value::String(s) if !s.is_empty() => Ok(s.clone()),
            _ => Err(failure()),
        })
        .collect()
}

/// A strictly positive integer, given as a JSON number or a numeric string
fn parse_positive(field: &'static str, value: Option<&Value>) -> Result<u64, ValidationFailure> {
    value
        .and_then(positive_integer)
        .ok_or_else(|| ValidationFailure::new(field, "Please provide a positive integer"))
}

/// Integers beyond `u64::MAX` saturate rather than fail
fn positive_integer(value: &Value) -> Option<u64> {
    let n = match value {
        Value::Number(n) => match n.as_u64() {
            Some(n) => n,
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 1.0)
                .map(|_| u64::MAX)?,
        },
        Value::String(s) => digits(s.trim())?,
        _ => return None,
    };
    (n > 0).then_some(n)
}

fn digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(s.parse::<u64>().unwrap_or(u64::MAX))
}

/// `template` must be a non-empty mapping whose `item` is a non-empty mapping
fn parse_template(value: Option<&Value>) -> Result<FeedTemplate, ValidationFailure> {
    let template = match value {
        Some(Value::Object(map)) if !map.is_empty() => map,
        _ => {
            return Err(ValidationFailure::new(
                "template",
                "Please provide a template with an item",
            ))
        }
    };

    let item = match template.get("item") {
        Some(Value::Object(map)) if !map.is_empty() => map,
        _ => {
            return Err(ValidationFailure::new(
                "template.item",
                "Please provide an item template as a non-empty mapping",
            ))
        }
    };

    Ok(FeedTemplate {
        title: template.get("title").and_then(text),
        description: template.get("description").and_then(text),
        link: template.get("link").and_then(text),
        ttl: template
            .get("ttl")
            .and_then(positive_integer)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX)),
        extra: unreserved(template, RESERVED_FEED_KEYS),
        item: ItemTemplate {
            title: item.get("title").and_then(text),
            description: item.get("description").and_then(text),
            link: item.get("link").and_then(text),
            extra: unreserved(item, RESERVED_ITEM_KEYS),
        },
    })
}

/// Text form of a template value; `null` counts as absent
fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn unreserved(map: &Map<String, Value>, reserved: &[&str]) -> BTreeMap<String, Value> {
    map.iter()
        .filter(|(key, _)| !reserved.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
