//! Nested `application/x-www-form-urlencoded` decoding.
//!
//! Keys use bracket notation to build nested values:
//!
//! ```text
//! user[name]=kim&user[tags][]=a&user[tags][]=b
//! => {"user": {"name": "kim", "tags": ["a", "b"]}}
//! ```
//!
//! Holes left by sparse indices (`a[3]=x`) are stored as `null` while
//! merging and compacted away at the end. Decoded values are always
//! strings, so `null` never collides with real data.

use serde_json::{Map, Value};

use crate::error::BodyError;

/// Maximum number of `&`-separated parameters accepted.
pub const PARAMETER_LIMIT: usize = 1000;

/// Maximum number of bracket segments; deeper keys are rejected.
pub const DEPTH_LIMIT: usize = 32;

/// Floor of the per-body array index limit.
pub const MIN_ARRAY_LIMIT: usize = 100;

/// Highest numeric index that still produces an array for a body with
/// `parameters` pairs.
pub fn array_limit(parameters: usize) -> usize {
    parameters.max(MIN_ARRAY_LIMIT)
}

/// Decode a form body into a JSON object.
pub fn decode(input: &[u8]) -> Result<Value, BodyError> {
    let parameters = input.iter().filter(|b| **b == b'&').count() + 1;
    if parameters > PARAMETER_LIMIT {
        return Err(BodyError::TooManyParameters {
            limit: PARAMETER_LIMIT,
        });
    }

    // Flat pass: identical raw keys combine into arrays.
    let mut flat: Map<String, Value> = Map::new();
    for (key, value) in url::form_urlencoded::parse(input) {
        if key.is_empty() {
            continue;
        }
        let value = Value::String(value.into_owned());
        match flat.get_mut(key.as_ref()) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                flat.insert(key.into_owned(), value);
            }
        }
    }

    let limit = array_limit(parameters);
    let mut root = Value::Object(Map::new());
    for (key, value) in flat {
        if let Some(nested) = expand_key(&key, value, limit)? {
            root = merge(root, nested);
        }
    }

    Ok(compact(root))
}

/// Position of the first `[...]` group (no brackets inside) at or after `from`.
fn find_group(key: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = key.as_bytes();
    let mut open = None;
    for (i, b) in bytes.iter().enumerate().skip(from) {
        match b {
            b'[' => open = Some(i),
            b']' => {
                if let Some(start) = open {
                    return Some((start, i + 1));
                }
            }
            _ => {}
        }
    }
    None
}

/// Split a raw key into its segments: `a[b][]` => `["a", "[b]", "[]"]`.
fn split_key(key: &str) -> Result<Vec<String>, BodyError> {
    let first = find_group(key, 0);
    let parent = match first {
        Some((start, _)) => &key[..start],
        None => key,
    };

    let mut segments = Vec::new();
    if !parent.is_empty() {
        segments.push(parent.to_string());
    }

    let mut cursor = first.map(|(start, _)| start);
    let mut depth = 0;
    while let Some(from) = cursor {
        let Some((start, end)) = find_group(key, from) else {
            break;
        };
        if depth == DEPTH_LIMIT {
            return Err(BodyError::DepthExceeded { limit: DEPTH_LIMIT });
        }
        segments.push(key[start..end].to_string());
        depth += 1;
        cursor = Some(end);
    }

    Ok(segments)
}

/// Build the nested value one key describes, innermost segment first.
fn expand_key(key: &str, value: Value, limit: usize) -> Result<Option<Value>, BodyError> {
    let segments = split_key(key)?;
    if segments.is_empty() {
        return Ok(None);
    }

    let mut leaf = value;
    for segment in segments.iter().rev() {
        leaf = if segment == "[]" {
            match leaf {
                Value::Array(_) => leaf,
                other => Value::Array(vec![other]),
            }
        } else {
            let bracketed = segment
                .strip_prefix('[')
                .and_then(|s| s.strip_suffix(']'));
            match bracketed.and_then(|name| array_index(name, limit)) {
                Some(index) => {
                    let mut items = vec![Value::Null; index];
                    items.push(leaf);
                    Value::Array(items)
                }
                None => {
                    let mut map = Map::new();
                    map.insert(bracketed.unwrap_or(segment).to_string(), leaf);
                    Value::Object(map)
                }
            }
        };
    }

    Ok(Some(leaf))
}

/// Canonical non-negative integers up to `limit`.
fn array_index(name: &str, limit: usize) -> Option<usize> {
    let index: usize = name.parse().ok()?;
    (index <= limit && index.to_string() == name).then_some(index)
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

fn array_to_object(items: Vec<Value>) -> Map<String, Value> {
    items
        .into_iter()
        .enumerate()
        .filter(|(_, item)| !item.is_null())
        .map(|(i, item)| (i.to_string(), item))
        .collect()
}

fn merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Array(mut items), Value::String(s)) => {
            items.push(Value::String(s));
            Value::Array(items)
        }
        (Value::Object(mut map), Value::String(s)) => {
            map.insert(s, Value::Bool(true));
            Value::Object(map)
        }
        (target, source) if !is_container(&target) => match source {
            Value::Array(items) => {
                let mut combined = vec![target];
                combined.extend(items.into_iter().filter(|v| !v.is_null()));
                Value::Array(combined)
            }
            other => Value::Array(vec![target, other]),
        },
        (Value::Array(mut items), Value::Array(incoming)) => {
            for (i, item) in incoming.into_iter().enumerate() {
                if item.is_null() {
                    continue;
                }
                match items.get_mut(i) {
                    Some(slot) if !slot.is_null() => {
                        if is_container(slot) && is_container(&item) {
                            let existing = slot.take();
                            *slot = merge(existing, item);
                        } else {
                            items.push(item);
                        }
                    }
                    Some(slot) => *slot = item,
                    None => {
                        items.resize(i, Value::Null);
                        items.push(item);
                    }
                }
            }
            Value::Array(items)
        }
        (Value::Array(items), Value::Object(map)) => {
            merge(Value::Object(array_to_object(items)), Value::Object(map))
        }
        (Value::Object(map), Value::Array(items)) => {
            merge(Value::Object(map), Value::Object(array_to_object(items)))
        }
        (Value::Object(mut map), Value::Object(incoming)) => {
            for (key, item) in incoming {
                match map.get_mut(&key) {
                    Some(existing) => {
                        let current = existing.take();
                        *existing = merge(current, item);
                    }
                    None => {
                        map.insert(key, item);
                    }
                }
            }
            Value::Object(map)
        }
        (target, _) => target,
    }
}

/// Drop the `null` holes left by sparse indices.
fn compact(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|item| !item.is_null())
                .map(compact)
                .collect(),
        ),
        Value::Object(map) => {
            Value::Object(map.into_iter().map(|(k, v)| (k, compact(v))).collect())
        }
        other => other,
    }
}
