//! Placeholder substitution
//!
//! Templates reference payload keys as `{{ key }}`. Substitution is a single
//! pass over the template text, so placeholders inside payload values are
//! never expanded. A key the payload lacks becomes an empty string.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::domain::entities::Payload;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{\s*([^{}\s]+)\s*\}\}").unwrap())
}

/// Substitute payload values into a template string
pub fn interpolate(template: &str, payload: &Payload) -> String {
    placeholder_pattern()
        .replace_all(template, |caps: &Captures| {
            let key = &caps[1];
            match payload.get(key) {
                Some(value) => value.clone(),
                None => {
                    tracing::debug!(missing = key, "Unresolved template placeholder");
                    String::new()
                }
            }
        })
        .into_owned()
}

/// Substitute into every string inside a template value.
///
/// Numbers, booleans and null are copied as they are.
pub fn interpolate_value(template: &Value, payload: &Payload) -> Value {
    match template {
        Value::String(s) => Value::String(interpolate(s, payload)),
        Value::Array(values) => Value::Array(
            values
                .iter()
                .map(|v| interpolate_value(v, payload))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), interpolate_value(v, payload)))
                .collect(),
        ),
        other => other.clone(),
    }
}
