//! Metadata value types for documents.

use serde::{Deserialize, Serialize};

/// A single metadata value attached to a document field.
///
/// Values are primitives or a flat list of primitives; nesting is not
/// supported. Field-index lookups and filter matching compare values by
/// their canonical string form (see [`FieldValue::canonical_strings`]).
///
/// # Examples
///
/// ```
/// use yari::FieldValue;
///
/// assert_eq!(FieldValue::Integer(42).canonical_strings(), vec!["42"]);
/// assert_eq!(
///     FieldValue::from(vec!["rust", "search"]).canonical_strings(),
///     vec!["rust", "search"]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text value.
    Text(String),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// Boolean value.
    Boolean(bool),
    /// Flat list of primitive values.
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Canonical string form of a primitive value.
    ///
    /// List values have no single canonical form; use
    /// [`FieldValue::canonical_strings`] to expand them.
    pub fn canonical_string(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Float(f) => Some(f.to_string()),
            FieldValue::Boolean(b) => Some(b.to_string()),
            FieldValue::List(_) => None,
        }
    }

    /// Canonical string forms of this value: one string for a
    /// primitive, one per element for a list. Nested lists contribute
    /// nothing.
    pub fn canonical_strings(&self) -> Vec<String> {
        match self {
            FieldValue::List(values) => values
                .iter()
                .filter_map(FieldValue::canonical_string)
                .collect(),
            other => other.canonical_string().into_iter().collect(),
        }
    }

    /// Convert to text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// True if this value is a primitive (not a list).
    pub fn is_primitive(&self) -> bool {
        !matches!(self, FieldValue::List(_))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }
}
