//! Weakness extraction from free-form advisor output.
//!
//! Model output is not guaranteed to follow the requested JSON shape, so the
//! text is run through progressively laxer strategies until one produces a
//! non-empty list:
//!
//! 1. JSON object (after unwrapping a fenced code block), with a single
//!    quote/newline repair pass when strict decoding fails
//! 2. Numbered or bulleted lines
//!
//! Extraction never fails; an empty list means nothing usable was found.

use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Code fence delimiter used by chat models.
const FENCE: &str = "```";

/// Fence segments that are only a language tag.
const LANGUAGE_TAGS: &[&str] = &["json", "javascript", "js"];

/// Lines shorter than this after stripping markers are treated as noise.
const MIN_LINE_CHARS: usize = 20;

/// Maximum items taken from the list-marker fallback.
const MAX_LIST_ITEMS: usize = 5;

type Strategy = fn(&str) -> Option<Vec<String>>;

/// Ordered extraction cascade; the first non-empty result wins.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("json", from_json_object as Strategy),
    ("list", from_list_markers as Strategy),
];

/// Extract an ordered list of weaknesses from raw model output.
pub fn extract(raw: &str) -> Vec<String> {
    for &(name, strategy) in STRATEGIES {
        if let Some(weaknesses) = strategy(raw).filter(|w| !w.is_empty()) {
            debug!(strategy = name, count = weaknesses.len(), "Extracted weaknesses");
            return weaknesses;
        }
    }

    warn!(preview = %preview(raw, 200), "No weaknesses could be extracted");
    Vec::new()
}

/// Pick the first fenced segment that looks like it holds a JSON object.
/// Falls back to the trimmed input when there is no such segment.
pub fn unwrap_fenced(raw: &str) -> &str {
    let trimmed = raw.trim();
    if !trimmed.contains(FENCE) {
        return trimmed;
    }

    trimmed
        .split(FENCE)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter(|part| !LANGUAGE_TAGS.contains(&part.to_lowercase().as_str()))
        .find(|part| part.contains('{'))
        .unwrap_or(trimmed)
}

/// Decode the span between the first `{` and the last `}`.
pub fn from_json_object(raw: &str) -> Option<Vec<String>> {
    let working = unwrap_fenced(raw);
    let start = working.find('{')?;
    let end = working.rfind('}')?;
    if end <= start {
        return None;
    }

    let object = decode_object(&working[start..=end])?;
    weaknesses_field(&object)
}

/// Numbered or bulleted lines of substantial length, at most five.
pub fn from_list_markers(raw: &str) -> Option<Vec<String>> {
    let items: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| is_list_item(line))
        .map(strip_list_marker)
        .filter(|item| item.chars().count() > MIN_LINE_CHARS)
        .map(str::to_string)
        .take(MAX_LIST_ITEMS)
        .collect();

    if items.is_empty() {
        None
    } else {
        debug!(count = items.len(), "Fell back to list-marker extraction");
        Some(items)
    }
}

/// Read `weaknesses` from a decoded object, or from a nested `result` object.
pub fn weaknesses_field(object: &Map<String, Value>) -> Option<Vec<String>> {
    if let Some(Value::Array(items)) = object.get("weaknesses") {
        return Some(to_strings(items));
    }

    match object.get("result") {
        Some(Value::Object(nested)) => match nested.get("weaknesses") {
            Some(Value::Array(items)) => Some(to_strings(items)),
            _ => None,
        },
        _ => None,
    }
}

fn decode_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Map<String, Value>>(candidate) {
        Ok(object) => Some(object),
        Err(strict_err) => {
            let repaired = candidate.replace('\'', "\"").replace('\n', " ");
            match serde_json::from_str::<Map<String, Value>>(&repaired) {
                Ok(object) => {
                    debug!(error = %strict_err, "Decoded JSON after quote/newline repair");
                    Some(object)
                }
                Err(repair_err) => {
                    debug!(error = %repair_err, "JSON object could not be decoded");
                    None
                }
            }
        }
    }
}

fn to_strings(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

fn is_list_item(line: &str) -> bool {
    match line.chars().next() {
        Some(first) => first.is_ascii_digit() || matches!(first, '-' | '*' | '•'),
        None => false,
    }
}

fn strip_list_marker(line: &str) -> &str {
    // `)` is included so "2) item" markers are stripped like "2. item"
    line.trim_start_matches(|c: char| c.is_ascii_digit() || matches!(c, '.' | ')' | '-' | '*' | '•' | ' '))
        .trim()
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        text.chars().take(max_chars).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
