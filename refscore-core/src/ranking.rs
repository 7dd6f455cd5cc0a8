//! Ranking quality metrics over graded relevance
//!
//! NDCG@k and reciprocal rank for a candidate ordering produced by the
//! system under test, scored against ground-truth relevance grades. The
//! grades are configuration; the engine never produces them.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A candidate identifier with its ground-truth relevance grade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedCandidate {
    pub id: String,
    pub relevance: u32,
    /// Free-text rationale carried in gold files; never consulted by the
    /// metrics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Collapse graded candidates into an id -> relevance lookup.
pub fn relevance_map(candidates: &[GradedCandidate]) -> HashMap<String, u32> {
    candidates
        .iter()
        .map(|c| (c.id.clone(), c.relevance))
        .collect()
}

/// Normalized discounted cumulative gain at cutoff `k`.
///
/// Gain is `2^rel - 1`, discount `log2(i + 2)`. The ideal DCG uses every
/// known relevance grade sorted descending, not just the grades of
/// candidates present in `order`; identifiers missing from the map grade 0.
/// Returns 0 for an empty ordering, `k == 0`, or a zero ideal; `k` larger
/// than the ordering is clamped.
pub fn ndcg<S: AsRef<str>>(order: &[S], relevance: &HashMap<String, u32>, k: usize) -> f64 {
    if order.is_empty() || k == 0 {
        return 0.0;
    }
    let k = k.min(order.len());

    let dcg: f64 = order
        .iter()
        .take(k)
        .enumerate()
        .map(|(i, id)| gain(grade(relevance, id.as_ref())) / discount(i))
        .sum();

    let mut ideal: Vec<u32> = relevance.values().copied().collect();
    ideal.sort_unstable_by(|a, b| b.cmp(a));
    let idcg: f64 = ideal
        .iter()
        .take(k)
        .enumerate()
        .map(|(i, &rel)| gain(rel) / discount(i))
        .sum();

    if idcg == 0.0 {
        0.0
    } else {
        dcg / idcg
    }
}

/// Reciprocal rank of the first candidate whose relevance meets
/// `threshold`; 0 when none qualifies.
pub fn mrr<S: AsRef<str>>(order: &[S], relevance: &HashMap<String, u32>, threshold: u32) -> f64 {
    order
        .iter()
        .position(|id| grade(relevance, id.as_ref()) >= threshold)
        .map_or(0.0, |i| 1.0 / (i + 1) as f64)
}

fn grade(relevance: &HashMap<String, u32>, id: &str) -> u32 {
    relevance.get(id).copied().unwrap_or(0)
}

fn gain(rel: u32) -> f64 {
    2f64.powi(rel as i32) - 1.0
}

fn discount(i: usize) -> f64 {
    ((i + 2) as f64).log2()
}

/// A candidate as scored by the system under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    pub id: String,
    pub score: f64,
}

/// Parse a model response of the form `{"rankings": [{"id", "score"}]}`
/// into candidate ids ordered by descending score.
///
/// The sort is stable, so tied scores keep the model's own ordering.
/// Malformed input yields an empty ordering, never an error.
pub fn parse_ranking(raw: &str) -> Vec<String> {
    #[derive(Deserialize)]
    struct Output {
        #[serde(default)]
        rankings: Vec<RankedResult>,
    }

    let Some(value) = crate::value::parse_lenient(raw) else {
        return Vec::new();
    };
    let mut rankings = match serde_json::from_value::<Output>(value) {
        Ok(output) => output.rankings,
        Err(e) => {
            tracing::debug!("response is not a ranking payload: {}", e);
            return Vec::new();
        }
    };
    rankings.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    rankings.into_iter().map(|r| r.id).collect()
}
