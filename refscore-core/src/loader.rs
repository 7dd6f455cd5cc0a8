//! Loading declarative evaluation inputs from JSON files
//!
//! Schemas, constraint sets, and gold rankings are configuration files
//! owned by the benchmark author, not model output, so a malformed file
//! here is a real error rather than a zero score.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ranking::GradedCandidate;
use crate::validate::{Constraints, Schema};

/// Error type for loading evaluation inputs
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Ground truth for one ranking scenario: the query plus graded candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldStandard {
    #[serde(default)]
    pub query: String,
    pub ranking: Vec<GradedCandidate>,
}

/// Load a record schema from a JSON file.
pub fn load_schema(path: impl AsRef<Path>) -> Result<Schema, LoadError> {
    load_json(path)
}

/// Load a constraint set from a JSON file.
pub fn load_constraints(path: impl AsRef<Path>) -> Result<Constraints, LoadError> {
    load_json(path)
}

/// Load a gold-standard ranking from a JSON file.
pub fn load_gold(path: impl AsRef<Path>) -> Result<GoldStandard, LoadError> {
    load_json(path)
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, LoadError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let parsed = serde_json::from_str(&content)?;
    tracing::debug!("loaded {}", path.display());
    Ok(parsed)
}
