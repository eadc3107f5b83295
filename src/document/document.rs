//! Document records for indexing.
//!
//! A corpus element is either bare text or a record carrying metadata;
//! [`DocumentInput`] is that tagged union at the API boundary. During
//! build each input becomes a frozen [`Document`] with a sequential id
//! and the authoritative token sequence produced by the tokenizer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::document::field_value::FieldValue;
use crate::error::{Result, YariError};

/// Metadata map attached to a document.
pub type Metadata = HashMap<String, FieldValue>;

/// A raw corpus element handed to the index builder.
///
/// # Examples
///
/// ```
/// use yari::{DocumentInput, FieldValue, Metadata};
///
/// let plain = DocumentInput::from("fn main() {}");
/// assert_eq!(plain.text(), "fn main() {}");
///
/// let mut meta = Metadata::new();
/// meta.insert("filePath".to_string(), FieldValue::from("src/main.rs"));
/// let record = DocumentInput::with_meta("fn main() {}", meta);
/// assert!(record.meta().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentInput {
    /// Plain text with no metadata.
    Text(String),
    /// Text plus a metadata map.
    Record {
        /// The document body to index.
        text: String,
        /// Arbitrary primitive-valued metadata.
        #[serde(default)]
        meta: Metadata,
    },
}

impl DocumentInput {
    /// Create a record input from text and metadata.
    pub fn with_meta<S: Into<String>>(text: S, meta: Metadata) -> Self {
        DocumentInput::Record {
            text: text.into(),
            meta,
        }
    }

    /// Convert a loosely-typed JSON value into a document input.
    ///
    /// Strings become text-only documents. Objects must carry a string
    /// `"text"` member; their remaining members become metadata, where
    /// each value is a primitive or a flat array of primitives. Every
    /// other shape fails with `InvalidDocument`.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(text) => Ok(DocumentInput::Text(text)),
            serde_json::Value::Object(mut members) => {
                let text = match members.remove("text") {
                    Some(serde_json::Value::String(text)) => text,
                    Some(other) => {
                        return Err(YariError::invalid_document(format!(
                            "document \"text\" member must be a string, got {other}"
                        )));
                    }
                    None => {
                        return Err(YariError::invalid_document(
                            "document object is missing a \"text\" member",
                        ));
                    }
                };

                let mut meta = Metadata::with_capacity(members.len());
                for (key, value) in members {
                    meta.insert(key.clone(), json_to_field_value(&key, value, false)?);
                }

                Ok(DocumentInput::Record { text, meta })
            }
            other => Err(YariError::invalid_document(format!(
                "corpus element must be a string or an object, got {other}"
            ))),
        }
    }

    /// The document body.
    pub fn text(&self) -> &str {
        match self {
            DocumentInput::Text(text) => text,
            DocumentInput::Record { text, .. } => text,
        }
    }

    /// The metadata map, if this input carries one.
    pub fn meta(&self) -> Option<&Metadata> {
        match self {
            DocumentInput::Text(_) => None,
            DocumentInput::Record { meta, .. } => Some(meta),
        }
    }

    /// Split into text and metadata, consuming the input.
    pub(crate) fn into_parts(self) -> (String, Metadata) {
        match self {
            DocumentInput::Text(text) => (text, Metadata::new()),
            DocumentInput::Record { text, meta } => (text, meta),
        }
    }
}

impl From<&str> for DocumentInput {
    fn from(text: &str) -> Self {
        DocumentInput::Text(text.to_string())
    }
}

impl From<String> for DocumentInput {
    fn from(text: String) -> Self {
        DocumentInput::Text(text)
    }
}

fn json_to_field_value(key: &str, value: serde_json::Value, nested: bool) -> Result<FieldValue> {
    match value {
        serde_json::Value::String(s) => Ok(FieldValue::Text(s)),
        serde_json::Value::Bool(b) => Ok(FieldValue::Boolean(b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(FieldValue::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(FieldValue::Float(f))
            } else {
                Err(YariError::invalid_document(format!(
                    "metadata field \"{key}\" has an unrepresentable number"
                )))
            }
        }
        serde_json::Value::Array(values) if !nested => {
            let mut elements = Vec::with_capacity(values.len());
            for value in values {
                elements.push(json_to_field_value(key, value, true)?);
            }
            Ok(FieldValue::List(elements))
        }
        other => Err(YariError::invalid_document(format!(
            "metadata field \"{key}\" must hold primitives or a flat list, got {other}"
        ))),
    }
}

/// A document frozen into the index.
///
/// The id is assigned in corpus order starting at 0 and is stable for
/// the index's lifetime. `terms` is the stop-filtered token sequence the
/// term statistics were built from; `raw_len` is the tokenizer's output
/// length before stop filtering, which drives length normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable document id.
    pub id: u32,
    /// Original text.
    pub text: String,
    /// Tokenized terms, stop words removed.
    pub terms: Vec<String>,
    /// Token count before stop-word removal.
    pub raw_len: u32,
    /// Metadata map.
    pub meta: Metadata,
}

impl Document {
    /// Look up a metadata field.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.meta.get(name)
    }

    /// True if the document carries the given metadata field.
    pub fn has_field(&self, name: &str) -> bool {
        self.meta.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_string() {
        let input = DocumentInput::from_json(json!("hello world")).unwrap();
        assert_eq!(input, DocumentInput::Text("hello world".to_string()));
    }

    #[test]
    fn test_from_json_object() {
        let input = DocumentInput::from_json(json!({
            "text": "rust search engine",
            "category": "ML",
            "year": 2024,
            "tags": ["rust", "search"],
        }))
        .unwrap();

        let (text, meta) = input.into_parts();
        assert_eq!(text, "rust search engine");
        assert_eq!(meta.get("category"), Some(&FieldValue::Text("ML".into())));
        assert_eq!(meta.get("year"), Some(&FieldValue::Integer(2024)));
        assert_eq!(
            meta.get("tags"),
            Some(&FieldValue::from(vec!["rust", "search"]))
        );
    }

    #[test]
    fn test_from_json_rejects_foreign_shapes() {
        assert!(matches!(
            DocumentInput::from_json(json!(42)),
            Err(YariError::InvalidDocument(_))
        ));
        assert!(matches!(
            DocumentInput::from_json(json!({ "body": "no text member" })),
            Err(YariError::InvalidDocument(_))
        ));
        assert!(matches!(
            DocumentInput::from_json(json!({ "text": "ok", "nested": { "a": 1 } })),
            Err(YariError::InvalidDocument(_))
        ));
        assert!(matches!(
            DocumentInput::from_json(json!({ "text": "ok", "deep": [[1, 2]] })),
            Err(YariError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_text_accessor() {
        let input = DocumentInput::from("plain");
        assert_eq!(input.text(), "plain");

        let input = DocumentInput::with_meta("with meta", Metadata::new());
        assert_eq!(input.text(), "with meta");
    }
}
