//! Declarative rule kinds and per-value checks

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Expected JSON type for a schema field or a `type` rule.
///
/// Unrecognized type names deserialize to [`FieldType::Other`], which
/// passes every check — unknown parts of a schema never fail a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Other,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Other => "other",
        }
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "string" => FieldType::String,
            "integer" => FieldType::Integer,
            "number" => FieldType::Number,
            "boolean" => FieldType::Boolean,
            "array" => FieldType::Array,
            _ => FieldType::Other,
        }
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.as_str().to_string()
    }
}

/// The kind of constraint a [`Rule`] applies.
///
/// Unknown kinds deserialize to [`RuleKind::Other`] and always pass
/// (permissive default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleKind {
    Range,
    Length,
    Pattern,
    Enum,
    Type,
    ArrayLength,
    Unique,
    DateRange,
    Other,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Range => "range",
            RuleKind::Length => "length",
            RuleKind::Pattern => "pattern",
            RuleKind::Enum => "enum",
            RuleKind::Type => "type",
            RuleKind::ArrayLength => "array_length",
            RuleKind::Unique => "unique",
            RuleKind::DateRange => "date_range",
            RuleKind::Other => "other",
        }
    }
}

impl From<String> for RuleKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "range" => RuleKind::Range,
            "length" => RuleKind::Length,
            "pattern" => RuleKind::Pattern,
            "enum" => RuleKind::Enum,
            "type" => RuleKind::Type,
            "array_length" => RuleKind::ArrayLength,
            "unique" => RuleKind::Unique,
            "date_range" => RuleKind::DateRange,
            _ => RuleKind::Other,
        }
    }
}

impl From<RuleKind> for String {
    fn from(k: RuleKind) -> Self {
        k.as_str().to_string()
    }
}

/// A single declarative validation rule for one field.
///
/// Read-only configuration: the validator never mutates rules at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub field: String,
    #[serde(rename = "rule")]
    pub kind: RuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_type: Option<FieldType>,
}

/// Check a value against an expected JSON type.
///
/// `integer` means a numeric value whose float representation equals its
/// truncation, since model output arrives as generic JSON numbers.
pub fn check_type(value: &Value, expected: FieldType) -> bool {
    match expected {
        FieldType::String => value.is_string(),
        FieldType::Integer => value.as_f64().is_some_and(|f| f == f.trunc()),
        FieldType::Number => value.is_number(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Array => value.is_array(),
        FieldType::Other => true,
    }
}

/// Check a single value against one rule.
///
/// `unique` always passes here; duplicate detection runs once per field
/// across the whole record set in [`crate::validate::validate_records`].
pub fn check_rule(value: &Value, rule: &Rule) -> bool {
    match rule.kind {
        RuleKind::Range => {
            let Some(f) = value.as_f64() else {
                return false;
            };
            if rule.min.is_some_and(|min| f < min) {
                return false;
            }
            if rule.max.is_some_and(|max| f > max) {
                return false;
            }
            true
        }

        RuleKind::Length => {
            let Some(s) = value.as_str() else {
                return false;
            };
            rule.exact.is_none_or(|exact| s.len() == exact)
        }

        RuleKind::Pattern => {
            let Some(s) = value.as_str() else {
                return false;
            };
            match rule.regex.as_deref() {
                None => true,
                Some(pattern) => match Regex::new(pattern) {
                    Ok(re) => re.is_match(s),
                    Err(e) => {
                        tracing::warn!(
                            "invalid regex in pattern rule for {:?}: {}",
                            rule.field,
                            e
                        );
                        false
                    }
                },
            }
        }

        RuleKind::Enum => {
            let s = crate::value::canonical_string(value).to_lowercase();
            rule.values.iter().any(|v| v.to_lowercase() == s)
        }

        RuleKind::Type => match rule.expected_type {
            Some(expected) => check_type(value, expected),
            None => true,
        },

        RuleKind::ArrayLength => {
            let Some(arr) = value.as_array() else {
                return false;
            };
            let len = arr.len() as f64;
            if rule.min.is_some_and(|min| len < min) {
                return false;
            }
            if rule.max.is_some_and(|max| len > max) {
                return false;
            }
            true
        }

        // Scored globally across the record set, not per record.
        RuleKind::Unique => true,

        RuleKind::DateRange => {
            let Some(s) = value.as_str() else {
                return false;
            };
            // Syntactic YYYY-MM-DD only; calendar validity is not checked.
            Regex::new(r"^\d{4}-\d{2}-\d{2}$")
                .map(|re| re.is_match(s))
                .unwrap_or(false)
        }

        RuleKind::Other => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(kind: RuleKind) -> Rule {
        Rule {
            field: "f".into(),
            kind,
            min: None,
            max: None,
            exact: None,
            regex: None,
            values: Vec::new(),
            expected_type: None,
        }
    }

    #[test]
    fn test_type_checks() {
        assert!(check_type(&json!("x"), FieldType::String));
        assert!(check_type(&json!(3), FieldType::Integer));
        assert!(!check_type(&json!(3.5), FieldType::Integer));
        assert!(check_type(&json!(3.5), FieldType::Number));
        assert!(check_type(&json!(true), FieldType::Boolean));
        assert!(check_type(&json!([1]), FieldType::Array));
        assert!(!check_type(&json!("3"), FieldType::Integer));
        // Unknown type names are permissive.
        assert!(check_type(&json!(null), FieldType::Other));
    }

    #[test]
    fn test_range_rule_bounds_are_optional() {
        let mut r = rule(RuleKind::Range);
        r.min = Some(0.0);
        assert!(check_rule(&json!(5), &r));
        assert!(!check_rule(&json!(-1), &r));
        r.max = Some(10.0);
        assert!(!check_rule(&json!(11), &r));
        assert!(check_rule(&json!(10), &r));
        assert!(!check_rule(&json!("not a number"), &r));
    }

    #[test]
    fn test_length_rule() {
        let mut r = rule(RuleKind::Length);
        r.exact = Some(5);
        assert!(check_rule(&json!("ABCDE"), &r));
        assert!(!check_rule(&json!("ABCD"), &r));
        assert!(!check_rule(&json!(12345), &r));
    }

    #[test]
    fn test_pattern_rule() {
        let mut r = rule(RuleKind::Pattern);
        r.regex = Some(r"^[A-Z]{2}-\d+$".into());
        assert!(check_rule(&json!("AB-123"), &r));
        assert!(!check_rule(&json!("ab-123"), &r));

        r.regex = Some("([unclosed".into());
        assert!(!check_rule(&json!("anything"), &r));
    }

    #[test]
    fn test_enum_rule_is_case_insensitive() {
        let mut r = rule(RuleKind::Enum);
        r.values = vec!["Active".into(), "Inactive".into()];
        assert!(check_rule(&json!("ACTIVE"), &r));
        assert!(!check_rule(&json!("deleted"), &r));
        // Non-strings compare by their string form.
        r.values = vec!["true".into()];
        assert!(check_rule(&json!(true), &r));
    }

    #[test]
    fn test_array_length_rule() {
        let mut r = rule(RuleKind::ArrayLength);
        r.min = Some(1.0);
        r.max = Some(3.0);
        assert!(check_rule(&json!([1, 2]), &r));
        assert!(!check_rule(&json!([]), &r));
        assert!(!check_rule(&json!([1, 2, 3, 4]), &r));
        assert!(!check_rule(&json!("no array"), &r));
    }

    #[test]
    fn test_date_range_rule_is_syntactic_only() {
        let r = rule(RuleKind::DateRange);
        assert!(check_rule(&json!("2024-06-01"), &r));
        // Lenient on calendar validity.
        assert!(check_rule(&json!("2024-02-30"), &r));
        assert!(!check_rule(&json!("June 1st, 2024"), &r));
        assert!(!check_rule(&json!(20240601), &r));
    }

    #[test]
    fn test_unknown_rule_kind_passes() {
        let raw = r#"{"field": "f", "rule": "entropy_check"}"#;
        let r: Rule = serde_json::from_str(raw).unwrap();
        assert_eq!(r.kind, RuleKind::Other);
        assert!(check_rule(&json!("whatever"), &r));
    }

    #[test]
    fn test_rule_deserializes_from_constraint_json() {
        let raw = r#"{
            "field": "amount",
            "rule": "range",
            "min": 0.01,
            "max": 10000
        }"#;
        let r: Rule = serde_json::from_str(raw).unwrap();
        assert_eq!(r.kind, RuleKind::Range);
        assert_eq!(r.min, Some(0.01));
        assert_eq!(r.max, Some(10000.0));
    }
}
