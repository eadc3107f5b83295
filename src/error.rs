//! Error types for the Yari library.
//!
//! All failures are represented by the [`YariError`] enum. Validation
//! errors (`EmptyCorpus`, `InvalidDocument`, `InvalidLimit`,
//! `UnknownField`) are produced before any work is enqueued; lifecycle
//! errors (`Disposed`, `Cancelled`, `WorkerTimeout`) come from the index
//! handle; `Internal` carries a scoring failure across the worker
//! boundary as text.

use thiserror::Error;

/// The main error type for Yari operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum YariError {
    /// Build was invoked with zero documents.
    #[error("invalid corpus: at least one document is required")]
    EmptyCorpus,

    /// A corpus element is neither a text nor a document record.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// A search was requested with a limit below 1.
    #[error("invalid limit: {0} (limit must be >= 1)")]
    InvalidLimit(usize),

    /// A filter referenced fields that are not in the indexed-fields set.
    #[error("unknown filter field(s) [{}]; indexed fields are [{}]", unknown.join(", "), known.join(", "))]
    UnknownField {
        /// Fields named by the filter but absent from the index.
        unknown: Vec<String>,
        /// Fields declared at build time.
        known: Vec<String>,
    },

    /// The index handle has been disposed.
    #[error("index has been disposed")]
    Disposed,

    /// The operation was interrupted by a concurrent dispose.
    #[error("operation cancelled by dispose")]
    Cancelled,

    /// A worker lifecycle phase exceeded its wall-clock budget.
    #[error("worker timeout during {0}")]
    WorkerTimeout(&'static str),

    /// An internal error propagated across the worker boundary.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for operations that may fail with [`YariError`].
pub type Result<T> = std::result::Result<T, YariError>;

impl YariError {
    /// Create a new invalid-document error.
    pub fn invalid_document<S: Into<String>>(msg: S) -> Self {
        YariError::InvalidDocument(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        YariError::Internal(msg.into())
    }

    /// Create an unknown-field error with sorted field listings.
    pub fn unknown_field(mut unknown: Vec<String>, mut known: Vec<String>) -> Self {
        unknown.sort();
        known.sort();
        YariError::UnknownField { unknown, known }
    }
}
