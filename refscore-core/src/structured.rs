//! Field-level comparison of structured JSON output
//!
//! Compares the top-level fields of an expected object against a model's
//! actual output, with case-insensitive key fallback and the cross-type
//! equivalence rules from [`crate::value`]. Nested objects and arrays are
//! compared as whole canonical values, never field by field.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::value::{canonical_string, parse_lenient, values_equivalent};

/// Per-field audit entry from a structured comparison.
///
/// The sequence of entries for one record follows the expected object's key
/// order, so the same inputs always produce the same trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldResult {
    pub field: String,
    pub expected: String,
    pub actual: String,
    pub matched: bool,
}

/// Compare two raw JSON objects field by field.
///
/// Returns `(matched, total, details)` where `total` is always the number
/// of top-level keys in the expected object. Unparseable actual input
/// scores zero matches with no details; unparseable expected input returns
/// `(0, 0, [])`. Never panics on malformed text.
pub fn field_match(expected_raw: &str, actual_raw: &str) -> (usize, usize, Vec<FieldResult>) {
    let expected = match parse_lenient(expected_raw) {
        Some(Value::Object(map)) => map,
        _ => return (0, 0, Vec::new()),
    };
    let actual = parse_lenient(actual_raw);
    compare_objects(&expected, actual.as_ref().and_then(Value::as_object))
}

/// Compare two raw JSON arrays of records positionally.
///
/// Position `i` is scored via field matching up to the shorter length.
/// Expected records past the end of the actual array contribute their full
/// field count as unmatched, penalizing missing rows; extra actual records
/// are ignored.
pub fn field_match_batch(expected_raw: &str, actual_raw: &str) -> (usize, usize, Vec<FieldResult>) {
    let expected_rows = match parse_lenient(expected_raw) {
        Some(Value::Array(rows)) => rows,
        _ => return (0, 0, Vec::new()),
    };
    // An unparseable actual array leaves every expected row unmatched.
    let actual_rows = match parse_lenient(actual_raw) {
        Some(Value::Array(rows)) => rows,
        _ => Vec::new(),
    };

    let mut matched_total = 0;
    let mut field_total = 0;
    let mut details = Vec::new();

    let limit = expected_rows.len().min(actual_rows.len());
    for i in 0..limit {
        let Some(expected_obj) = expected_rows[i].as_object() else {
            continue;
        };
        let (matched, total, row_details) =
            compare_objects(expected_obj, actual_rows[i].as_object());
        matched_total += matched;
        field_total += total;
        details.extend(row_details);
    }

    for row in expected_rows.iter().skip(limit) {
        if let Some(obj) = row.as_object() {
            field_total += obj.len();
        }
    }

    (matched_total, field_total, details)
}

/// Quality ratio for a `(matched, total)` pair; 0 when nothing was counted.
pub fn match_ratio(matched: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        matched as f64 / total as f64
    }
}

fn compare_objects(
    expected: &Map<String, Value>,
    actual: Option<&Map<String, Value>>,
) -> (usize, usize, Vec<FieldResult>) {
    let total = expected.len();
    let Some(actual) = actual else {
        return (0, total, Vec::new());
    };

    let mut matched = 0;
    let mut details = Vec::with_capacity(total);

    for (key, expected_value) in expected {
        let found = lookup(actual, key);
        let is_match = found.is_some_and(|value| values_equivalent(expected_value, value));
        if is_match {
            matched += 1;
        }
        details.push(FieldResult {
            field: key.clone(),
            expected: canonical_string(expected_value),
            actual: found.map(canonical_string).unwrap_or_default(),
            matched: is_match,
        });
    }

    (matched, total, details)
}

/// Exact key lookup with a case-insensitive fallback.
fn lookup<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if let Some(value) = obj.get(key) {
        return Some(value);
    }
    let folded = key.to_lowercase();
    obj.iter()
        .find(|(k, _)| k.to_lowercase() == folded)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_objects_match_fully() {
        let raw = r#"{"invoice_id": "INV-7", "total": 129.95, "paid": false}"#;
        let (matched, total, details) = field_match(raw, raw);
        assert_eq!((matched, total), (3, 3));
        assert_eq!(details.len(), 3);
        assert!(details.iter().all(|d| d.matched));
    }

    #[test]
    fn test_unparseable_actual_scores_zero_without_panicking() {
        let (matched, total, details) =
            field_match(r#"{"a": 1, "b": 2}"#, "Sorry, I can't help with that.");
        assert_eq!((matched, total), (0, 2));
        assert!(details.is_empty());
    }

    #[test]
    fn test_unparseable_expected_yields_empty_result() {
        let (matched, total, details) = field_match("not json", r#"{"a": 1}"#);
        assert_eq!((matched, total), (0, 0));
        assert!(details.is_empty());
    }

    #[test]
    fn test_case_insensitive_key_fallback() {
        let (matched, total, details) =
            field_match(r#"{"Customer": "acme"}"#, r#"{"customer": "ACME"}"#);
        assert_eq!((matched, total), (1, 1));
        assert_eq!(details[0].field, "Customer");
        assert!(details[0].matched);
    }

    #[test]
    fn test_number_formatting_differences_match() {
        let (matched, total, _) =
            field_match(r#"{"total": 1249.50}"#, r#"{"total": 1249.5}"#);
        assert_eq!((matched, total), (1, 1));
        let (matched, total, _) =
            field_match(r#"{"total": 1249.50}"#, r#"{"total": 1.2495e3}"#);
        assert_eq!((matched, total), (1, 1));
    }

    #[test]
    fn test_cross_type_id_matches() {
        let (matched, total, _) = field_match(r#"{"id": "42"}"#, r#"{"id": 42}"#);
        assert_eq!((matched, total), (1, 1));
    }

    #[test]
    fn test_nested_values_compare_as_wholes() {
        let expected = r#"{"tags": ["a", "b"], "meta": {"x": 1, "y": 2}}"#;
        let actual = r#"{"meta": {"y": 2, "x": 1}, "tags": ["a", "b"]}"#;
        let (matched, total, _) = field_match(expected, actual);
        assert_eq!((matched, total), (2, 2));
    }

    #[test]
    fn test_missing_field_is_recorded() {
        let (matched, total, details) =
            field_match(r#"{"id": 1, "status": "open"}"#, r#"{"id": 1}"#);
        assert_eq!((matched, total), (1, 2));
        let miss = details.iter().find(|d| d.field == "status").unwrap();
        assert!(!miss.matched);
        assert_eq!(miss.actual, "");
    }

    #[test]
    fn test_batch_scores_rows_positionally() {
        let expected = r#"[{"a": 1}, {"a": 2}]"#;
        let actual = r#"[{"a": 1}, {"a": 3}]"#;
        let (matched, total, details) = field_match_batch(expected, actual);
        assert_eq!((matched, total), (1, 2));
        assert_eq!(details.len(), 2);
        assert_eq!(match_ratio(matched, total), 0.5);
    }

    #[test]
    fn test_batch_penalizes_missing_rows() {
        let expected = r#"[{"a": 1, "b": 2}, {"a": 3, "b": 4}]"#;
        let actual = r#"[{"a": 1, "b": 2}]"#;
        let (matched, total, _) = field_match_batch(expected, actual);
        assert_eq!((matched, total), (2, 4));
    }

    #[test]
    fn test_batch_ignores_extra_rows() {
        let expected = r#"[{"a": 1}]"#;
        let actual = r#"[{"a": 1}, {"a": 2}, {"a": 3}]"#;
        let (matched, total, _) = field_match_batch(expected, actual);
        assert_eq!((matched, total), (1, 1));
    }

    #[test]
    fn test_batch_unparseable_actual_counts_all_fields() {
        let expected = r#"[{"a": 1, "b": 2}]"#;
        let (matched, total, details) = field_match_batch(expected, "garbage");
        assert_eq!((matched, total), (0, 2));
        assert!(details.is_empty());
    }

    #[test]
    fn test_match_ratio_guards_zero_total() {
        assert_eq!(match_ratio(0, 0), 0.0);
        assert_eq!(match_ratio(3, 4), 0.75);
    }
}
