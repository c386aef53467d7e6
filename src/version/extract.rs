//! Extraction of a version string from a response body
//!
//! Each upstream feed has its own shape: a JSON document queried by pointer,
//! a JSON array of releases or tags, or an HTML/plain-text page matched with
//! a regular expression.

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::version::semver::find_stable_max;

/// Which regex match to take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// First match in document order
    First,
    /// Highest stable semantic version among all matches
    Max,
}

/// Strategy for pulling the latest version out of a response
#[derive(Debug, Clone)]
pub enum Extractor {
    /// String or number at a JSON pointer (e.g. `/tag_name`, `/0/latest`)
    Json { pointer: String },
    /// Highest stable version in a JSON array, optionally reading `field`
    /// from each element
    JsonMax {
        array: String,
        field: Option<String>,
    },
    /// Capture group 1 of a regex over the raw body
    Regex { pattern: Regex, pick: Pick },
}

impl Extractor {
    pub fn json(pointer: &str) -> Self {
        Extractor::Json {
            pointer: pointer.to_string(),
        }
    }

    pub fn json_max(array: &str, field: Option<&str>) -> Self {
        Extractor::JsonMax {
            array: array.to_string(),
            field: field.map(str::to_string),
        }
    }

    /// Panics if `pattern` is not a valid regex; patterns are compile-time literals.
    pub fn regex(pattern: &str, pick: Pick) -> Self {
        Extractor::Regex {
            pattern: Regex::new(pattern).expect("extractor pattern is valid"),
            pick,
        }
    }

    /// Returns the extracted version, or None if the body has the wrong shape
    pub fn extract(&self, body: &str) -> Option<String> {
        let extracted = match self {
            Extractor::Json { pointer } => {
                let doc = parse_json(body)?;
                doc.pointer(pointer).and_then(scalar_to_string)
            }
            Extractor::JsonMax { array, field } => {
                let doc = parse_json(body)?;
                let items = doc.pointer(array)?.as_array()?;
                let candidates: Vec<String> = items
                    .iter()
                    .filter_map(|item| match field {
                        Some(field) => item.get(field.as_str()).and_then(scalar_to_string),
                        None => scalar_to_string(item),
                    })
                    .collect();
                find_stable_max(candidates.iter().map(String::as_str))
            }
            Extractor::Regex { pattern, pick } => {
                let mut matches = pattern
                    .captures_iter(body)
                    .filter_map(|caps| caps.get(1).map(|m| m.as_str()));
                match pick {
                    Pick::First => matches.next().map(str::to_string),
                    Pick::Max => find_stable_max(matches),
                }
            }
        };

        extracted
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

fn parse_json(body: &str) -> Option<Value> {
    serde_json::from_str(body)
        .inspect_err(|e| debug!("Response is not valid JSON: {}", e))
        .ok()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
