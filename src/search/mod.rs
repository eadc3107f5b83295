//! Query-time scoring: BM25 accumulation, top-k selection, feedback.

pub mod collector;
pub mod feedback;
pub mod scorer;

use std::sync::Arc;

use crate::document::Document;

/// A single ranked search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Id of the matched document.
    pub doc_id: u32,
    /// BM25 score of the match.
    pub score: f64,
    /// The matched document.
    pub document: Arc<Document>,
}
