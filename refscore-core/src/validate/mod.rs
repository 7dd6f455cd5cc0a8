//! Constraint validation for generated record sets
//!
//! Scores a batch of model-generated records against a declarative schema
//! and rule set, producing a weighted compliance score plus a violation log.
//! One pass, no shared state: every call builds its result from scratch.

pub mod rules;

pub use rules::{check_rule, check_type, FieldType, Rule, RuleKind};

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value::{canonical_string, values_equivalent, Record};

const SCHEMA_WEIGHT: f64 = 0.4;
const RULE_WEIGHT: f64 = 0.4;
const UNIQUENESS_WEIGHT: f64 = 0.2;

/// Schema describing the records a model was asked to generate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Target record count; a mismatch is logged but not scored.
    pub count: usize,
    pub fields: Vec<FieldDef>,
}

/// A single field in a schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub description: String,
}

/// Declarative rule set evaluated against a generated record set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default)]
    pub schema: String,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cross_field_rules: Vec<CrossFieldRule>,
}

/// A conditional relationship between two fields: when `if_field` holds
/// `if_value`, `then_field` must hold `then_value`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossFieldRule {
    pub if_field: String,
    pub if_value: Value,
    pub then_field: String,
    pub then_value: Value,
}

/// Compliance score breakdown for one validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreDetail {
    pub schema_compliance: f64,
    pub rule_compliance: f64,
    pub uniqueness: f64,
    /// Weighted composite: 0.4 schema + 0.4 rules + 0.2 uniqueness.
    pub overall: f64,
    /// One human-readable entry per failed check, in evaluation order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
}

/// Parse a model response of the form `{"records": [...]}` into a record
/// set. Malformed input yields an empty set, which validates to a zero
/// score — never an error.
pub fn parse_records(raw: &str) -> Vec<Record> {
    #[derive(Deserialize)]
    struct Output {
        #[serde(default)]
        records: Vec<Record>,
    }

    let Some(value) = crate::value::parse_lenient(raw) else {
        return Vec::new();
    };
    match serde_json::from_value::<Output>(value) {
        Ok(output) => output.records,
        Err(e) => {
            tracing::debug!("response is not a record payload: {}", e);
            Vec::new()
        }
    }
}

/// Validate a record set against a schema and its constraints.
///
/// Schema compliance counts presence, non-null, and type per record and
/// schema field. Rule compliance counts every declared rule against every
/// record that has the target field, plus triggered cross-field checks.
/// Uniqueness multiplies `1 - duplicates/records` across all unique-marked
/// fields. Every failed check appends exactly one violation string.
pub fn validate_records(
    records: &[Record],
    schema: &Schema,
    constraints: &Constraints,
) -> ScoreDetail {
    let mut violations = Vec::new();
    let mut total_field_checks = 0usize;
    let mut passed_field_checks = 0usize;
    let mut total_rule_checks = 0usize;
    let mut passed_rule_checks = 0usize;

    // Count mismatch is reported but deliberately left out of the score.
    if records.len() != schema.count {
        violations.push(format!(
            "expected {} records, got {}",
            schema.count,
            records.len()
        ));
    }

    for (i, record) in records.iter().enumerate() {
        for field in &schema.fields {
            total_field_checks += 1;
            match record.get(&field.name) {
                None => {
                    violations.push(format!("record {}: missing field {:?}", i, field.name));
                }
                Some(Value::Null) => {
                    violations.push(format!("record {}: field {:?} is null", i, field.name));
                }
                Some(value) => {
                    if check_type(value, field.field_type) {
                        passed_field_checks += 1;
                    } else {
                        violations.push(format!(
                            "record {}: field {:?} has wrong type (expected {})",
                            i,
                            field.name,
                            field.field_type.as_str()
                        ));
                    }
                }
            }
        }
    }

    for rule in &constraints.rules {
        for (i, record) in records.iter().enumerate() {
            let Some(value) = record.get(&rule.field) else {
                continue;
            };
            total_rule_checks += 1;
            if check_rule(value, rule) {
                passed_rule_checks += 1;
            } else {
                violations.push(format!(
                    "record {}: field {:?} violates rule {:?}",
                    i,
                    rule.field,
                    rule.kind.as_str()
                ));
            }
        }
    }

    for cross in &constraints.cross_field_rules {
        for (i, record) in records.iter().enumerate() {
            let Some(if_value) = record.get(&cross.if_field) else {
                continue;
            };
            if !values_equivalent(&cross.if_value, if_value) {
                continue;
            }
            total_rule_checks += 1;
            let holds = record
                .get(&cross.then_field)
                .is_some_and(|value| values_equivalent(&cross.then_value, value));
            if holds {
                passed_rule_checks += 1;
            } else {
                violations.push(format!(
                    "record {}: {:?}={} requires {:?}={}",
                    i,
                    cross.if_field,
                    canonical_string(&cross.if_value),
                    cross.then_field,
                    canonical_string(&cross.then_value)
                ));
            }
        }
    }

    let uniqueness = uniqueness_factor(records, &constraints.rules);
    let schema_compliance = ratio(passed_field_checks, total_field_checks);
    let rule_compliance = ratio(passed_rule_checks, total_rule_checks);
    let overall = SCHEMA_WEIGHT * schema_compliance
        + RULE_WEIGHT * rule_compliance
        + UNIQUENESS_WEIGHT * uniqueness;

    ScoreDetail {
        schema_compliance,
        rule_compliance,
        uniqueness,
        overall,
        violations,
    }
}

/// Duplicate penalty across all unique-marked fields: `1 - dup/count` per
/// field, multiplied together. 1.0 when nothing is marked unique.
fn uniqueness_factor(records: &[Record], rules: &[Rule]) -> f64 {
    let mut factor = 1.0;
    if records.is_empty() {
        return factor;
    }

    let unique_fields: BTreeSet<&str> = rules
        .iter()
        .filter(|r| r.kind == RuleKind::Unique)
        .map(|r| r.field.as_str())
        .collect();

    for field in unique_fields {
        let mut seen = HashSet::new();
        let mut duplicates = 0usize;
        for record in records {
            let Some(value) = record.get(field) else {
                continue;
            };
            if !seen.insert(canonical_string(value)) {
                duplicates += 1;
            }
        }
        if duplicates > 0 {
            factor *= 1.0 - duplicates as f64 / records.len() as f64;
        }
    }

    factor
}

fn ratio(passed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64
    }
}
