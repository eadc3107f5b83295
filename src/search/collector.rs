//! Top-k selection over the score accumulator.
//!
//! When the candidate set is no larger than `k` everything is sorted
//! directly; otherwise a fixed-capacity min-heap keeps the current best
//! `k`, replacing its weakest entry whenever a better candidate shows
//! up. Ranking is by descending score with ascending doc id breaking
//! ties, applied identically in the heap and the final sort so results
//! are deterministic.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A scored document inside the heap.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScoredDoc {
    doc_id: u32,
    score: f64,
}

impl Eq for ScoredDoc {}

impl PartialOrd for ScoredDoc {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredDoc {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max of the heap is the weakest entry: lowest score, and on
        // equal scores the larger doc id.
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

/// Rank ordering for result lists: descending score, ascending doc id.
pub(crate) fn rank_cmp(a: &(u32, f64), b: &(u32, f64)) -> Ordering {
    b.1.partial_cmp(&a.1)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.0.cmp(&b.0))
}

/// Select the top `k` touched documents from the accumulator.
///
/// Returns `(doc_id, score)` pairs in rank order.
pub fn top_k(scores: &[f64], touched: &[u32], k: usize) -> Vec<(u32, f64)> {
    if k >= touched.len() {
        let mut all: Vec<(u32, f64)> = touched
            .iter()
            .map(|&doc_id| (doc_id, scores[doc_id as usize]))
            .collect();
        all.sort_by(rank_cmp);
        return all;
    }

    let mut heap: BinaryHeap<ScoredDoc> = BinaryHeap::with_capacity(k);
    for &doc_id in touched {
        let candidate = ScoredDoc {
            doc_id,
            score: scores[doc_id as usize],
        };
        if heap.len() < k {
            heap.push(candidate);
        } else if let Some(weakest) = heap.peek() {
            if candidate.cmp(weakest) == Ordering::Less {
                heap.pop();
                heap.push(candidate);
            }
        }
    }

    let mut selected: Vec<(u32, f64)> = heap
        .into_iter()
        .map(|doc| (doc.doc_id, doc.score))
        .collect();
    selected.sort_by(rank_cmp);
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_candidate_set_sorted() {
        let scores = vec![0.5, 2.0, 0.0, 1.0];
        let touched = vec![3, 0, 1];

        let top = top_k(&scores, &touched, 10);
        assert_eq!(top, vec![(1, 2.0), (3, 1.0), (0, 0.5)]);
    }

    #[test]
    fn test_heap_keeps_best_k() {
        let scores = vec![0.1, 0.9, 0.5, 0.7, 0.3];
        let touched = vec![0, 1, 2, 3, 4];

        let top = top_k(&scores, &touched, 2);
        assert_eq!(top, vec![(1, 0.9), (3, 0.7)]);
    }

    #[test]
    fn test_equal_scores_rank_by_doc_id() {
        let scores = vec![1.0, 1.0, 1.0, 1.0];
        let touched = vec![2, 0, 3, 1];

        let top = top_k(&scores, &touched, 3);
        assert_eq!(top, vec![(0, 1.0), (1, 1.0), (2, 1.0)]);
    }

    #[test]
    fn test_tie_break_independent_of_touch_order() {
        let scores = vec![1.0, 1.0];
        assert_eq!(top_k(&scores, &[1, 0], 1), vec![(0, 1.0)]);
        assert_eq!(top_k(&scores, &[0, 1], 1), vec![(0, 1.0)]);
    }

    #[test]
    fn test_empty_touched() {
        assert!(top_k(&[], &[], 5).is_empty());
    }
}
