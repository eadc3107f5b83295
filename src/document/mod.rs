//! Document records and metadata values.

pub mod document;
pub mod field_value;

pub use document::{Document, DocumentInput, Metadata};
pub use field_value::FieldValue;
