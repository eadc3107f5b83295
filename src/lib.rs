//! # Yari
//!
//! An in-memory, full-text search engine built around Okapi BM25 ranking.
//!
//! ## Features
//!
//! - Compact inverted index with gap-encoded packed postings
//! - BM25 scoring with top-k selection
//! - Exact-match metadata filtering over declared fields
//! - One background scoring worker per index, shared by concurrent queries
//! - Rocchio-style relevance feedback
//! - Partitioned indexes with per-partition IDF
//!
//! The index is immutable once built; all queries run against frozen state.
//!
//! ## Example
//!
//! ```
//! use yari::{BuildConfig, DocumentInput, SearchIndex, SearchOptions};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> yari::Result<()> {
//! let docs = vec![
//!     DocumentInput::from("the quick brown fox"),
//!     DocumentInput::from("the lazy dog sleeps"),
//! ];
//! let index = SearchIndex::build(docs, BuildConfig::default()).await?;
//! let hits = index.search("fox", SearchOptions::default()).await?;
//! assert_eq!(hits[0].doc_id, 0);
//! index.dispose().await;
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod document;
pub mod engine;
pub mod error;
pub mod index;
pub mod partitioned;
pub mod search;

pub use document::{Document, DocumentInput, FieldValue, Metadata};
pub use engine::{BuildConfig, FeedbackOptions, SearchIndex, SearchOptions};
pub use error::{Result, YariError};
pub use partitioned::PartitionedIndex;
pub use search::SearchHit;

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
