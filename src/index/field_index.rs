//! Field index: exact-match metadata filtering.
//!
//! For every field declared at build time, the index keeps a map from
//! canonical value string to the sorted set of doc ids carrying that
//! value. Filters union doc ids within a clause's value list and
//! intersect across clauses.

use std::collections::HashMap;

use ahash::{AHashMap, AHashSet};

use crate::document::{Document, FieldValue};
use crate::error::{Result, YariError};

/// Per-field value buckets for filter evaluation.
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    /// Field names declared at build time.
    fields: Vec<String>,
    /// field name -> canonical value -> sorted unique doc ids.
    buckets: AHashMap<String, AHashMap<String, Vec<u32>>>,
}

impl FieldIndex {
    /// Build the field index over `docs` for the declared fields.
    ///
    /// Documents without a value for a field contribute nothing to that
    /// field's buckets; list values contribute the doc id under each
    /// element's canonical string.
    pub fn build<'a, I>(docs: I, index_fields: &[String]) -> Self
    where
        I: Iterator<Item = &'a Document> + Clone,
    {
        let mut buckets: AHashMap<String, AHashMap<String, Vec<u32>>> =
            AHashMap::with_capacity(index_fields.len());

        for field in index_fields {
            let mut values: AHashMap<String, Vec<u32>> = AHashMap::new();
            for doc in docs.clone() {
                if let Some(value) = doc.meta.get(field) {
                    for key in value.canonical_strings() {
                        values.entry(key).or_default().push(doc.id);
                    }
                }
            }
            for ids in values.values_mut() {
                ids.sort_unstable();
                ids.dedup();
            }
            buckets.insert(field.clone(), values);
        }

        FieldIndex {
            fields: index_fields.to_vec(),
            buckets,
        }
    }

    /// Fields declared at build time.
    pub fn known_fields(&self) -> &[String] {
        &self.fields
    }

    /// Check whether a field was declared at build time.
    pub fn is_indexed(&self, field: &str) -> bool {
        self.buckets.contains_key(field)
    }

    /// Doc ids carrying `value` in `field`, if any.
    pub fn docs_for(&self, field: &str, value: &str) -> Option<&[u32]> {
        self.buckets
            .get(field)?
            .get(value)
            .map(|ids| ids.as_slice())
    }

    /// Resolve a filter into the set of allowed doc ids.
    ///
    /// Returns `Ok(None)` when the filter is empty (no constraint).
    /// An empty returned set means no document satisfies the filter;
    /// the scorer short-circuits on it. Fails with `UnknownField` if
    /// any clause names a field that was not declared at build time.
    pub fn resolve_filter(
        &self,
        filter: &HashMap<String, FieldValue>,
    ) -> Result<Option<AHashSet<u32>>> {
        if filter.is_empty() {
            return Ok(None);
        }

        let unknown: Vec<String> = filter
            .keys()
            .filter(|field| !self.is_indexed(field))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(YariError::unknown_field(unknown, self.fields.clone()));
        }

        let mut allowed: Option<AHashSet<u32>> = None;
        for (field, value) in filter {
            let mut candidates: AHashSet<u32> = AHashSet::new();
            for key in value.canonical_strings() {
                if let Some(ids) = self.docs_for(field, &key) {
                    candidates.extend(ids.iter().copied());
                }
            }

            allowed = Some(match allowed {
                None => candidates,
                Some(current) => current.intersection(&candidates).copied().collect(),
            });

            if allowed.as_ref().is_some_and(|set| set.is_empty()) {
                break;
            }
        }

        Ok(allowed)
    }
}
