//! LLM response normalizer.
//!
//! Turns whatever a provider sent back into a `serde_json::Value`, trying one
//! strategy after another, and coerces loosely-typed fields into the shapes the
//! domain types expect. Nothing here knows about companies or news: callers
//! pick the keys, this module only deals with JSON shape.
//!
//! Parse strategies, in order:
//! 1. the payload as-is
//! 2. the payload with markdown code fences removed
//! 3. the first `{`/`[` through the last matching `}`/`]`
//!
//! For truncated array payloads, `extract_complete_objects` salvages every
//! flat object that made it through intact.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::llm_client::ToolPayload;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("LLM returned no payload")]
    Empty,

    #[error("LLM output is not parseable JSON: {snippet}")]
    Unparseable { snippet: String },
}

/// Innermost JSON object: no nested braces between the delimiters.
static FLAT_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^{}]*\}").expect("flat object pattern is valid"));

/// Separators the models use when they return a list as one string.
static LIST_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[、,，;；/\n]+").expect("separator pattern is valid"));

/// Line or clause breaks inside a prose answer.
static SENTENCE_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\n；;。]+").expect("sentence separator pattern is valid"));

/// Leading list markers: `1.`, `2、`, `(3)`, `-`, `•`.
static LIST_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[(（]?\d+[.、)）]|[-•*·])\s*").expect("list marker pattern is valid")
});

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Best-effort extraction of the outermost JSON value embedded in prose.
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let close = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(close)?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

/// Parses LLM text into JSON, trying each strategy in turn.
pub fn parse_lenient(text: &str) -> Result<Value, NormalizeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(NormalizeError::Empty);
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    let unfenced = strip_json_fences(trimmed);
    if let Ok(value) = serde_json::from_str::<Value>(unfenced) {
        return Ok(value);
    }

    if let Some(block) = extract_json_block(unfenced) {
        if let Ok(value) = serde_json::from_str::<Value>(block) {
            return Ok(value);
        }
    }

    Err(NormalizeError::Unparseable {
        snippet: trimmed.chars().take(120).collect(),
    })
}

/// JSON value of a completion payload, whether it came as tool arguments or text.
pub fn payload_value(payload: &ToolPayload) -> Result<Value, NormalizeError> {
    match payload {
        ToolPayload::Arguments(args) => parse_lenient(args),
        ToolPayload::Content(content) => parse_lenient(content),
        ToolPayload::Empty => Err(NormalizeError::Empty),
    }
}

/// Recovers every complete flat object from a possibly-truncated payload.
/// Objects missing any of `required_keys`, or holding a blank value there, are skipped.
pub fn extract_complete_objects(text: &str, required_keys: &[&str]) -> Vec<Map<String, Value>> {
    FLAT_OBJECT
        .find_iter(text)
        .filter_map(|m| serde_json::from_str::<Value>(m.as_str()).ok())
        .filter_map(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .filter(|map| {
            required_keys
                .iter()
                .all(|key| map.get(*key).is_some_and(|v| !is_blank(v)))
        })
        .collect()
}

/// Null, whitespace-only strings, and empty containers.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// First non-null value among several candidate keys (the models rename fields).
pub fn get_any<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find(|v| !v.is_null())
}

/// The array a payload carries: the value itself, one of the wrapper keys,
/// or the only array-valued field of an object.
pub fn array_field<'a>(value: &'a Value, wrapper_keys: &[&str]) -> Option<&'a Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => {
            if let Some(items) = wrapper_keys
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_array))
            {
                return Some(items);
            }
            let mut arrays = map.values().filter_map(Value::as_array);
            match (arrays.next(), arrays.next()) {
                (Some(only), None) => Some(only),
                _ => None,
            }
        }
        _ => None,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
    .filter(|s| !s.is_empty())
}

/// Coerces a string, number or list into one display string.
pub fn string_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(scalar_to_string)
            .collect::<Vec<_>>()
            .join("；"),
        Some(v) => scalar_to_string(v).unwrap_or_default(),
        None => String::new(),
    }
}

/// Coerces an array, a delimited string, or a scalar into a de-duplicated list.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    let raw: Vec<String> = match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(Value::String(s)) => LIST_SEPARATORS
            .split(s)
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        Some(v) => scalar_to_string(v).into_iter().collect(),
        None => Vec::new(),
    };
    dedup_preserving_order(raw)
}

/// Like `string_list`, but for prose: a string is split into sentences or
/// numbered items, never on commas.
pub fn sentence_list(value: Option<&Value>) -> Vec<String> {
    let raw: Vec<String> = match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(scalar_to_string)
            .map(|item| LIST_MARKER.replace(&item, "").trim().to_string())
            .collect(),
        Some(Value::String(s)) => SENTENCE_SEPARATORS
            .split(s)
            .map(|part| LIST_MARKER.replace(part, "").trim().to_string())
            .collect(),
        Some(v) => scalar_to_string(v).into_iter().collect(),
        None => Vec::new(),
    };
    dedup_preserving_order(raw.into_iter().filter(|s| !s.is_empty()).collect())
}

/// Number or numeric string (`"85"`, `"85分"`, `"85%"`) rounded and clamped to 0–100.
pub fn score_field(value: Option<&Value>) -> Option<u32> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s
            .trim()
            .trim_end_matches(['%', '分'])
            .trim()
            .parse::<f64>()
            .ok()?,
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    Some(number.round().clamp(0.0, 100.0) as u32)
}

/// Integer from a number or a string starting with digits (`"2019年"` → 2019).
pub fn int_field(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

pub fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
