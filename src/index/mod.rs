//! Immutable index state and its builder.
//!
//! [`IndexState`] is constructed once by [`builder::build_index`] and
//! never mutated afterwards. The owning handle and its background
//! worker share it through an `Arc` without locking.

pub mod builder;
pub mod dictionary;
pub mod field_index;

use std::sync::Arc;

use crate::analysis::WordTokenizer;
use crate::document::Document;
use crate::index::dictionary::{TermDictionary, TermInfo};
use crate::index::field_index::FieldIndex;

/// Frozen index state: documents, dictionary, packed postings, length
/// norms, and the field index.
#[derive(Debug)]
pub struct IndexState {
    /// Documents in id order.
    docs: Vec<Arc<Document>>,
    /// Term dictionary with pre-computed IDF per term.
    dictionary: TermDictionary,
    /// Packed postings: per term `[Δdoc, tf, Δdoc, tf, ...]` blocks in
    /// lexicographic term order.
    postings: Vec<u32>,
    /// BM25 length normalizer per document.
    norms: Vec<f64>,
    /// Mean raw token count across documents.
    avg_doc_len: f64,
    /// Metadata filter buckets.
    field_index: FieldIndex,
    /// Tokenizer shared by build and query analysis.
    tokenizer: WordTokenizer,
}

/// Summary statistics for a built index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexStats {
    /// Number of documents.
    pub doc_count: usize,
    /// Number of distinct terms.
    pub term_count: usize,
    /// Total packed postings slots.
    pub postings_len: usize,
    /// Mean raw token count.
    pub avg_doc_len: f64,
}

impl IndexState {
    /// Number of documents in the index.
    pub fn doc_count(&self) -> usize {
        self.docs.len()
    }

    /// Look up a document by id.
    pub fn doc(&self, id: u32) -> Option<&Arc<Document>> {
        self.docs.get(id as usize)
    }

    /// All documents in id order.
    pub fn docs(&self) -> &[Arc<Document>] {
        &self.docs
    }

    /// The term dictionary.
    pub fn dictionary(&self) -> &TermDictionary {
        &self.dictionary
    }

    /// The packed postings block for a dictionary entry.
    pub fn postings_block(&self, info: &TermInfo) -> &[u32] {
        let start = info.offset as usize;
        let end = start + info.len as usize;
        &self.postings[start..end]
    }

    /// Length normalizer for a document.
    pub fn norm(&self, doc_id: u32) -> f64 {
        self.norms[doc_id as usize]
    }

    /// The field index used for filtering.
    pub fn field_index(&self) -> &FieldIndex {
        &self.field_index
    }

    /// The tokenizer configured for this index.
    pub fn tokenizer(&self) -> &WordTokenizer {
        &self.tokenizer
    }

    /// Summary statistics.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            doc_count: self.docs.len(),
            term_count: self.dictionary.len(),
            postings_len: self.postings.len(),
            avg_doc_len: self.avg_doc_len,
        }
    }
}
