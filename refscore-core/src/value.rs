//! Canonical value handling and equivalence rules
//!
//! Everything that compares model output to a reference goes through the
//! rules here: lenient JSON parsing, canonical serialization, and the
//! cross-type equivalence check used by the structured comparator and the
//! constraint validator.

use indexmap::IndexMap;
use serde_json::Value;

/// A generated record: field names mapped to JSON values, in the order
/// the model emitted them.
pub type Record = IndexMap<String, Value>;

/// Parse raw model output as JSON, tolerating surrounding whitespace.
///
/// Returns `None` when the text is not valid JSON. Callers degrade to
/// raw-string comparison or a zero score; a parse failure is never an error.
pub fn parse_lenient(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str(trimmed) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("input is not valid JSON: {}", e);
            None
        }
    }
}

/// Render a value for diagnostics: strings keep their original casing and
/// contents, everything else serializes to canonical JSON.
pub fn canonical_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => canonical_json(other),
    }
}

/// Canonical JSON serialization: compact, with object keys sorted at every
/// nesting level and numbers re-rendered from their numeric value, so that
/// key order, whitespace, trailing zeros, and exponent notation in the
/// source text are all irrelevant to equality.
pub fn canonical_json(value: &Value) -> String {
    serde_json::to_string(&canonicalize(value)).unwrap_or_default()
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = serde_json::Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Number(n) => Value::Number(normalize_number(n)),
        other => other.clone(),
    }
}

/// Re-derive a number from its numeric value so that `1249.50`, `1249.5`,
/// and `1.2495e3` all canonicalize identically. Whole values render as
/// integers, matching the usual JSON writer output for them. Numbers with
/// no finite f64 form are kept as parsed.
fn normalize_number(n: &serde_json::Number) -> serde_json::Number {
    let Some(f) = n.as_f64() else {
        return n.clone();
    };
    if !f.is_finite() {
        return n.clone();
    }
    if f.fract() == 0.0 && f.abs() <= i64::MAX as f64 {
        serde_json::Number::from(f as i64)
    } else {
        serde_json::Number::from_f64(f).unwrap_or_else(|| n.clone())
    }
}

/// Equivalence check between an expected and an actual value.
///
/// Strings compare trimmed and case-folded. A string and a non-string are
/// equal when the non-string's JSON serialization, stripped of surrounding
/// quotes, matches the trimmed string exactly — so `"29451023"` is
/// equivalent to the bare number `29451023`, but `"TRUE"` does not match
/// the boolean `true`. Any other pair compares by canonical serialization.
pub fn values_equivalent(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::String(e), Value::String(a)) => fold(e) == fold(a),
        (Value::String(s), other) | (other, Value::String(s)) => {
            let serialized = canonical_json(other);
            s.trim() == serialized.trim_matches('"')
        }
        (e, a) => canonical_json(e) == canonical_json(a),
    }
}

fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}
