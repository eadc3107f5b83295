//! BM25 scoring over the packed postings.
//!
//! The scorer walks each query term's gap-encoded postings block,
//! accumulating contributions into a dense per-document array and a
//! touched list, then hands both to the top-k collector.

use std::collections::HashSet;

use ahash::AHashSet;

use crate::index::IndexState;
use crate::search::collector;
use crate::search::SearchHit;

/// BM25 term-frequency saturation parameter.
pub const K1: f64 = 1.2;

/// BM25 length-normalization parameter.
pub const B: f64 = 0.75;

/// Score `query` against the index and return the top `limit` hits.
///
/// `allowed` restricts scoring to the given doc ids; an empty set
/// short-circuits to no results. Empty and out-of-vocabulary queries
/// return an empty list, never an error. The caller validates `limit`.
pub fn search(
    state: &IndexState,
    query: &str,
    limit: usize,
    allowed: Option<&AHashSet<u32>>,
    stop_words: Option<&HashSet<String>>,
) -> Vec<SearchHit> {
    let tokens = state.tokenizer().tokenize(query, stop_words);
    if tokens.is_empty() {
        return Vec::new();
    }
    if allowed.is_some_and(|set| set.is_empty()) {
        return Vec::new();
    }

    let mut scores = vec![0.0f64; state.doc_count()];
    let mut touched: Vec<u32> = Vec::new();

    for token in &tokens {
        let Some(info) = state.dictionary().get(token) else {
            continue;
        };
        let idf = info.idf;
        let block = state.postings_block(info);

        let mut doc_id = 0u32;
        for pair in block.chunks_exact(2) {
            doc_id += pair[0];
            if allowed.is_some_and(|set| !set.contains(&doc_id)) {
                continue;
            }

            let tf = pair[1] as f64;
            let contribution = idf * (tf * (K1 + 1.0)) / (tf + K1 * state.norm(doc_id));

            let slot = &mut scores[doc_id as usize];
            if *slot == 0.0 {
                touched.push(doc_id);
            }
            *slot += contribution;
        }
    }

    if touched.is_empty() {
        return Vec::new();
    }

    collector::top_k(&scores, &touched, limit)
        .into_iter()
        .map(|(doc_id, score)| SearchHit {
            doc_id,
            score,
            document: state
                .doc(doc_id)
                .expect("touched doc id is always in range")
                .clone(),
        })
        .collect()
}
