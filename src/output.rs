//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::entity::Entity;
use crate::resource::Resource;

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

/// Keys shown first, in this order, when present.
const HEADLINE_KEYS: [&str; 6] = ["name", "version", "group", "classifier", "purl", "uuid"];

/// Keys holding epoch-millisecond timestamps.
const TIMESTAMP_KEYS: [&str; 2] = ["lastBomImport", "lastVulnerabilityAnalysis"];

impl PrettyPrint for Entity {
    fn pretty_print(&self) -> String {
        let title = self
            .str_field("name")
            .or_else(|| self.uuid())
            .unwrap_or("(unnamed)");
        let header = format!("Entity: {title}");
        let divider = "─".repeat(header.chars().count().max(30));

        let mut lines = vec![header, divider];

        for key in HEADLINE_KEYS {
            if let Some(value) = self.get(key) {
                lines.push(format_line(key, value));
            }
        }

        let mut rest: Vec<(&String, &Value)> = self
            .iter()
            .filter(|(k, _)| !HEADLINE_KEYS.contains(&k.as_str()))
            .collect();
        rest.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in rest {
            lines.push(format_line(key, value));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Resource {
    fn pretty_print(&self) -> String {
        format!("Path: {}\n{}", self.path(), self.data().pretty_print())
    }
}

fn format_line(key: &str, value: &Value) -> String {
    format!("{:<16}{}", format!("{key}:"), render_value(key, value))
}

/// Render a value for a single display line.
pub fn render_value(key: &str, value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) if TIMESTAMP_KEYS.contains(&key) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| n.to_string()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(o) => o
                    .get("name")
                    .or_else(|| o.get("url"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| item.to_string()),
                other => render_value(key, other),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_pretty_print_format() {
        let entity = Entity::from_value(json!({
            "uuid": "abc",
            "name": "acme",
            "version": "1.0",
            "active": true,
            "lastBomImport": 1_700_000_000_000_i64,
            "tags": [{"name": "prod"}, {"name": "eu"}]
        }))
        .unwrap();

        let output = entity.pretty_print();
        assert!(output.starts_with("Entity: acme"));
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[2].starts_with("name:"));
        assert!(lines[3].starts_with("version:"));
        assert!(output.contains("2023-11-14 22:13:20 UTC"));
        assert!(output.contains("prod, eu"));
    }

    #[test]
    fn test_unnamed_entity() {
        let entity = Entity::from_value(json!({"token": "t"})).unwrap();
        assert!(entity.pretty_print().starts_with("Entity: (unnamed)"));
    }
}
