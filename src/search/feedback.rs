//! Rocchio-style relevance feedback.
//!
//! Feedback pulls the query toward the terms of known-relevant
//! documents: relevant term weights are length-normalized per document,
//! merged with the original query terms under the alpha/beta weights,
//! and the strongest merged terms are re-expanded into a bag-of-words
//! query with log-scaled repetition.

use ahash::AHashMap;

use crate::index::IndexState;

/// Maximum number of merged terms kept in the expansion.
const MAX_EXPANSION_TERMS: usize = 30;

/// Maximum number of times a single term is repeated.
const MAX_TERM_REPEAT: usize = 8;

/// Expand `query` with terms from the given relevant documents.
///
/// Returns `None` when there is nothing to expand from (no relevant
/// ids, none of them resolve to documents, or the expansion came out
/// empty); the caller then runs the original query unchanged.
pub fn expand_query(
    state: &IndexState,
    query: &str,
    relevant: &[u32],
    alpha: f64,
    beta: f64,
) -> Option<String> {
    if relevant.is_empty() {
        return None;
    }

    let found: Vec<_> = relevant
        .iter()
        .filter_map(|&id| state.doc(id))
        .collect();
    if found.is_empty() {
        return None;
    }

    // Accumulate length-normalized term weights over relevant docs so
    // long documents do not dominate the expansion.
    let mut feedback_weights: AHashMap<&str, f64> = AHashMap::new();
    for doc in &found {
        if doc.terms.is_empty() {
            continue;
        }
        let unit = 1.0 / doc.terms.len() as f64;
        for term in &doc.terms {
            *feedback_weights.entry(term.as_str()).or_insert(0.0) += unit;
        }
    }

    let query_terms = state.tokenizer().tokenize_raw(query);

    let mut merged: AHashMap<String, f64> = AHashMap::new();
    for term in &query_terms {
        merged.entry(term.clone()).or_insert(alpha);
    }
    let found_scale = 1.0 / found.len() as f64;
    for (term, weight) in feedback_weights {
        *merged.entry(term.to_string()).or_insert(0.0) += beta * weight * found_scale;
    }

    let mut ranked: Vec<(String, f64)> = merged.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.truncate(MAX_EXPANSION_TERMS);

    let mut expansion: Vec<String> = Vec::new();
    for (term, weight) in &ranked {
        for _ in 0..repeat_count(*weight) {
            expansion.push(term.clone());
        }
    }

    // Original query terms that fell out of the top stay in the query.
    for term in &query_terms {
        if !ranked.iter().any(|(kept, _)| kept == term) && !expansion.contains(term) {
            expansion.push(term.clone());
        }
    }

    if expansion.is_empty() {
        None
    } else {
        Some(expansion.join(" "))
    }
}

/// Log-scaled repetition: `clamp(round(1 + ln(w)), 1, 8)` for finite
/// weights above 1, otherwise a single occurrence.
fn repeat_count(weight: f64) -> usize {
    if weight > 1.0 && weight.is_finite() {
        (1.0 + weight.ln()).round().clamp(1.0, MAX_TERM_REPEAT as f64) as usize
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentInput;
    use crate::index::builder::build_index;
    use std::collections::HashSet;

    fn build(texts: &[&str]) -> IndexState {
        let inputs = texts.iter().map(|t| DocumentInput::from(*t)).collect();
        build_index(inputs, &["filePath".to_string()], &HashSet::new()).unwrap()
    }

    #[test]
    fn test_no_relevant_ids_is_no_expansion() {
        let state = build(&["machine learning models"]);
        assert!(expand_query(&state, "learning", &[], 1.0, 0.75).is_none());
    }

    #[test]
    fn test_unknown_relevant_ids_fall_back() {
        let state = build(&["machine learning models"]);
        assert!(expand_query(&state, "learning", &[99], 1.0, 0.75).is_none());
    }

    #[test]
    fn test_expansion_contains_relevant_terms() {
        let state = build(&[
            "neural networks learn representations",
            "gradient descent optimizes networks",
            "databases store rows",
        ]);

        let expanded = expand_query(&state, "learn", &[0, 1], 1.0, 0.75).unwrap();
        assert!(expanded.contains("learn"));
        assert!(expanded.contains("networks"));
        assert!(!expanded.contains("databases"));
    }

    #[test]
    fn test_query_terms_survive_expansion() {
        let state = build(&["alpha beta gamma", "delta epsilon zeta"]);
        let expanded = expand_query(&state, "omega", &[0], 1.0, 0.75).unwrap();
        assert!(expanded.split(' ').any(|t| t == "omega"));
    }

    #[test]
    fn test_repeat_count_scaling() {
        assert_eq!(repeat_count(0.5), 1);
        assert_eq!(repeat_count(1.0), 1);
        assert_eq!(repeat_count(f64::INFINITY), 1);
        assert_eq!(repeat_count(2.0), 2); // round(1 + ln 2) = 2
        assert_eq!(repeat_count(1e12), 8); // clamped
    }
}
