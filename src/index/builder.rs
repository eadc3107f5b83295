//! Two-pass index construction.
//!
//! Pass one tokenizes every document (in parallel) and collects
//! per-document term frequencies. Pass two inverts those into the
//! packed, gap-encoded postings array and the term dictionary, then
//! computes length norms and the field index.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use ahash::AHashMap;
use rayon::prelude::*;

use crate::analysis::WordTokenizer;
use crate::document::{Document, DocumentInput};
use crate::error::{Result, YariError};
use crate::index::dictionary::{TermDictionary, TermInfo};
use crate::index::field_index::FieldIndex;
use crate::index::IndexState;
use crate::search::scorer;

/// Per-document output of the tokenization pass.
struct AnalyzedDoc {
    /// Token count before stop-word removal; drives length norms.
    raw_len: u32,
    /// Tokens surviving the stop set, in source order.
    terms: Vec<String>,
    /// Term frequencies over `terms`.
    term_freqs: AHashMap<String, u32>,
}

/// Build a frozen index over `inputs`.
///
/// Ids are assigned in iteration order from 0. Fails with `EmptyCorpus`
/// when `inputs` is empty.
pub fn build_index(
    inputs: Vec<DocumentInput>,
    index_fields: &[String],
    stop_words: &HashSet<String>,
) -> Result<IndexState> {
    if inputs.is_empty() {
        return Err(YariError::EmptyCorpus);
    }

    let tokenizer = WordTokenizer::new();

    let parts: Vec<(String, crate::document::Metadata)> = inputs
        .into_iter()
        .map(DocumentInput::into_parts)
        .collect();

    // Pass one: tokenize and count, one unit per document.
    let analyzed: Vec<AnalyzedDoc> = parts
        .par_iter()
        .map(|(text, _)| analyze(&tokenizer, text, stop_words))
        .collect();

    let docs: Vec<Arc<Document>> = parts
        .into_iter()
        .zip(analyzed.iter())
        .enumerate()
        .map(|(id, ((text, meta), doc))| {
            Arc::new(Document {
                id: id as u32,
                text,
                terms: doc.terms.clone(),
                raw_len: doc.raw_len,
                meta,
            })
        })
        .collect();

    // Pass two: invert into per-term (doc, tf) runs. Documents are
    // visited in ascending id order, so each run is already sorted.
    let mut inverted: BTreeMap<&str, Vec<(u32, u32)>> = BTreeMap::new();
    for (id, doc) in analyzed.iter().enumerate() {
        for (term, &tf) in &doc.term_freqs {
            inverted
                .entry(term.as_str())
                .or_default()
                .push((id as u32, tf));
        }
    }

    let doc_count = docs.len();
    let mut postings: Vec<u32> = Vec::new();
    let mut dictionary: BTreeMap<String, TermInfo> = BTreeMap::new();

    for (term, entries) in inverted {
        let offset = postings.len() as u32;
        let mut previous = 0u32;
        for &(doc_id, tf) in &entries {
            postings.push(doc_id - previous);
            postings.push(tf);
            previous = doc_id;
        }
        let len = (entries.len() * 2) as u32;
        let idf = inverse_doc_frequency(doc_count, entries.len());
        dictionary.insert(term.to_string(), TermInfo::new(offset, len, idf));
    }

    let total_len: u64 = analyzed.iter().map(|doc| doc.raw_len as u64).sum();
    let avg_doc_len = total_len as f64 / doc_count as f64;
    let norms = analyzed
        .iter()
        .map(|doc| length_norm(doc.raw_len, avg_doc_len))
        .collect();

    let field_index = FieldIndex::build(docs.iter().map(Arc::as_ref), index_fields);

    Ok(IndexState {
        docs,
        dictionary: TermDictionary::from_map(dictionary),
        postings,
        norms,
        avg_doc_len,
        field_index,
        tokenizer,
    })
}

fn analyze(tokenizer: &WordTokenizer, text: &str, stop_words: &HashSet<String>) -> AnalyzedDoc {
    let raw = tokenizer.tokenize_raw(text);
    let raw_len = raw.len() as u32;

    let terms: Vec<String> = if stop_words.is_empty() {
        raw
    } else {
        raw.into_iter()
            .filter(|term| !stop_words.contains(term))
            .collect()
    };

    let mut term_freqs = AHashMap::with_capacity(terms.len());
    for term in &terms {
        *term_freqs.entry(term.clone()).or_insert(0u32) += 1;
    }

    AnalyzedDoc {
        raw_len,
        terms,
        term_freqs,
    }
}

/// Smoothed IDF: `ln((N - df + 0.5) / (df + 0.5) + 1)`.
fn inverse_doc_frequency(doc_count: usize, doc_frequency: usize) -> f64 {
    let n = doc_count as f64;
    let df = doc_frequency as f64;
    ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
}

/// BM25 length normalizer: `(1 - b) + b * len / avg`.
fn length_norm(raw_len: u32, avg_doc_len: f64) -> f64 {
    if avg_doc_len == 0.0 {
        return 1.0;
    }
    (1.0 - scorer::B) + scorer::B * (raw_len as f64 / avg_doc_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_fields() -> Vec<String> {
        vec!["filePath".to_string()]
    }

    fn build(texts: &[&str]) -> IndexState {
        let inputs = texts.iter().map(|t| DocumentInput::from(*t)).collect();
        build_index(inputs, &default_fields(), &HashSet::new()).unwrap()
    }

    #[test]
    fn test_empty_corpus_rejected() {
        let result = build_index(Vec::new(), &default_fields(), &HashSet::new());
        assert_eq!(result.unwrap_err(), YariError::EmptyCorpus);
    }

    #[test]
    fn test_sequential_ids_and_terms() {
        let state = build(&["the quick fox", "lazy dog"]);
        assert_eq!(state.doc_count(), 2);
        assert_eq!(state.doc(0).unwrap().terms, vec!["the", "quick", "fox"]);
        assert_eq!(state.doc(1).unwrap().id, 1);
    }

    #[test]
    fn test_postings_are_gap_encoded() {
        let state = build(&["fox", "dog", "fox fox"]);
        let info = state.dictionary().get("fox").unwrap();
        // fox appears in docs 0 and 2: [Δ0, tf1, Δ2, tf2].
        assert_eq!(state.postings_block(info), &[0, 1, 2, 2]);
        assert_eq!(info.doc_frequency(), 2);
    }

    #[test]
    fn test_block_lengths_cover_postings() {
        let state = build(&["alpha beta", "beta gamma", "gamma alpha beta"]);
        let total: u32 = state.dictionary().iter().map(|(_, info)| info.len).sum();
        assert_eq!(total as usize, state.stats().postings_len);
    }

    #[test]
    fn test_idf_formula() {
        let state = build(&["fox", "fox", "dog", "cat"]);
        let info = state.dictionary().get("fox").unwrap();
        // N = 4, df = 2.
        let expected = ((4.0 - 2.0 + 0.5) / (2.0 + 0.5) + 1.0_f64).ln();
        assert!((info.idf - expected).abs() < 1e-12);
    }

    #[test]
    fn test_norms_use_raw_length() {
        let inputs = vec![
            DocumentInput::from("the fox"),
            DocumentInput::from("dog sleeps here"),
        ];
        let stops: HashSet<String> = ["the".to_string()].into_iter().collect();
        let state = build_index(inputs, &default_fields(), &stops).unwrap();

        // Raw lengths 2 and 3 (stop word still counted), avg 2.5.
        assert_eq!(state.doc(0).unwrap().raw_len, 2);
        assert_eq!(state.doc(0).unwrap().terms, vec!["fox"]);
        let expected = (1.0 - scorer::B) + scorer::B * (2.0 / 2.5);
        assert!((state.norm(0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_stop_words_excluded_from_dictionary() {
        let inputs = vec![DocumentInput::from("the fox and the dog")];
        let stops: HashSet<String> =
            ["the".to_string(), "and".to_string()].into_iter().collect();
        let state = build_index(inputs, &default_fields(), &stops).unwrap();

        assert!(state.dictionary().get("the").is_none());
        assert!(state.dictionary().get("fox").is_some());
    }

    #[test]
    fn test_stats() {
        let state = build(&["alpha beta", "alpha"]);
        let stats = state.stats();
        assert_eq!(stats.doc_count, 2);
        assert_eq!(stats.term_count, 2);
        assert!((stats.avg_doc_len - 1.5).abs() < 1e-12);
    }
}
