//! Exact-match and token-level text metrics

use std::collections::HashMap;

/// Error type for comparisons that cannot produce a score at all, as
/// opposed to scoring zero.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("prediction/label length mismatch: {predictions} vs {labels}")]
    LengthMismatch { predictions: usize, labels: usize },
}

/// True iff the trimmed, case-folded strings are identical.
pub fn exact_match(expected: &str, actual: &str) -> bool {
    expected.trim().to_lowercase() == actual.trim().to_lowercase()
}

/// Punctuation stripped from token edges.
const TOKEN_TRIM: &[char] = &[
    '.', ',', ';', ':', '!', '?', '"', '\'', '(', ')', '[', ']', '{', '}', '#', '*', '-',
];

/// Split text into lowercase word tokens with surrounding punctuation
/// stripped. Tokens that are nothing but punctuation are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| word.trim_matches(TOKEN_TRIM))
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// Token-level F1 between two token multisets.
///
/// True positives count each token up to `min` of its occurrences on the
/// two sides. Returns 0 when either side is empty — never NaN.
pub fn token_f1<S: AsRef<str>>(expected: &[S], actual: &[S]) -> f64 {
    if expected.is_empty() || actual.is_empty() {
        return 0.0;
    }

    let expected_counts = count_tokens(expected);
    let actual_counts = count_tokens(actual);

    let true_positives: usize = expected_counts
        .iter()
        .filter_map(|(token, &n)| actual_counts.get(token).map(|&m| n.min(m)))
        .sum();
    if true_positives == 0 {
        return 0.0;
    }

    let precision = true_positives as f64 / actual.len() as f64;
    let recall = true_positives as f64 / expected.len() as f64;
    2.0 * precision * recall / (precision + recall)
}

fn count_tokens<S: AsRef<str>>(tokens: &[S]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for token in tokens {
        *counts.entry(token.as_ref()).or_insert(0) += 1;
    }
    counts
}

/// Exact-match accuracy over parallel prediction/label sequences.
///
/// Sequences of differing length are a reportable condition, not a zero
/// score. Empty inputs score 0.
pub fn accuracy<S: AsRef<str>>(predictions: &[S], labels: &[S]) -> Result<f64, ScoreError> {
    if predictions.len() != labels.len() {
        return Err(ScoreError::LengthMismatch {
            predictions: predictions.len(),
            labels: labels.len(),
        });
    }
    if labels.is_empty() {
        return Ok(0.0);
    }
    let matched = predictions
        .iter()
        .zip(labels)
        .filter(|(p, l)| exact_match(p.as_ref(), l.as_ref()))
        .count();
    Ok(matched as f64 / labels.len() as f64)
}
