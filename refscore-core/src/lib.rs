//! Deterministic scoring of model output against known-good references
//!
//! This crate turns `(expected, actual)` pairs into quality signals in
//! `[0, 1]` plus structured diagnostics, independent of how the values were
//! obtained. It is the scoring half of a benchmark harness: the half that
//! calls a model, parses flags, and renders report tables lives elsewhere
//! and treats this crate as a pure library.
//!
//! # Components
//!
//! - [`value`] — lenient JSON parsing, canonical serialization, and the
//!   cross-type equivalence rules everything else builds on
//! - [`text`] — exact match, token-level F1, and label-sequence accuracy
//! - [`structured`] — field-level comparison of JSON objects and arrays of
//!   records, with a per-field audit trail
//! - [`ranking`] — NDCG@k and reciprocal rank over graded relevance
//! - [`validate`] — schema/rule/uniqueness compliance scoring for
//!   generated record sets
//! - [`loader`] — JSON file loading for schemas, constraints, and gold
//!   rankings
//!
//! Every function is pure and synchronous; malformed model output degrades
//! to a zero score or an empty result, never a panic.
//!
//! # Example
//!
//! ```
//! use refscore::structured::{field_match, match_ratio};
//!
//! let (matched, total, details) = field_match(
//!     r#"{"invoice_id": "29451023", "status": "Paid"}"#,
//!     r#"{"Invoice_ID": 29451023, "status": "PAID"}"#,
//! );
//! assert_eq!((matched, total), (2, 2));
//! assert_eq!(match_ratio(matched, total), 1.0);
//! assert!(details.iter().all(|d| d.matched));
//! ```

pub mod loader;
pub mod ranking;
pub mod structured;
pub mod text;
pub mod validate;
pub mod value;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::loader::{load_constraints, load_gold, load_schema, GoldStandard, LoadError};
    pub use crate::ranking::{
        mrr, ndcg, parse_ranking, relevance_map, GradedCandidate, RankedResult,
    };
    pub use crate::structured::{field_match, field_match_batch, match_ratio, FieldResult};
    pub use crate::text::{accuracy, exact_match, token_f1, tokenize, ScoreError};
    pub use crate::validate::{
        parse_records, validate_records, Constraints, CrossFieldRule, FieldDef, FieldType, Rule,
        RuleKind, Schema, ScoreDetail,
    };
    pub use crate::value::{
        canonical_json, canonical_string, parse_lenient, values_equivalent, Record,
    };
}
