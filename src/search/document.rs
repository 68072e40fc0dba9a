//! Flattened search documents

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::Entry;

/// Plain-text projection of an entry handed to the search index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDocument {
    pub id: String,
    pub title: String,
    /// Body with markdown syntax removed
    pub body: String,
    pub schema_key: String,
    /// Every string leaf of the attributes, space separated
    pub all_text: String,
}

impl SearchDocument {
    pub fn from_entry(entry: &Entry) -> Self {
        let mut leaves = Vec::new();
        for value in entry.attributes.values() {
            extract_strings(value, &mut leaves);
        }

        Self {
            id: entry.id.to_string(),
            title: entry.base.title.clone(),
            body: strip_markdown(&entry.body),
            schema_key: entry.schema_key.clone(),
            all_text: leaves.join(" "),
        }
    }
}

/// Collect every string leaf of `value`, depth-first.
pub fn extract_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|v| extract_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| extract_strings(v, out)),
        _ => {}
    }
}

static MARKDOWN_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

// Order matters: fenced code before inline code, bold before italic.
fn markdown_patterns() -> &'static [Regex] {
    MARKDOWN_PATTERNS.get_or_init(|| {
        [
            r"#{1,6}\s",
            r"\*\*([^*]+)\*\*",
            r"\*([^*]+)\*",
            r"\[([^\]]+)\]\([^)]+\)",
            r"```[^`]*```",
            r"`([^`]+)`",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

/// Remove common markdown syntax, keeping the readable text.
pub fn strip_markdown(markdown: &str) -> String {
    let mut text = markdown.to_string();
    for pattern in markdown_patterns() {
        text = pattern.replace_all(&text, "$1").into_owned();
    }
    text.trim().to_string()
}
