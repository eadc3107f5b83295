//! Term dictionary mapping terms to their postings block and IDF.
//!
//! The dictionary is a pair of parallel arrays sorted by term, built
//! once from a `BTreeMap` and looked up by binary search. Block layout
//! in the packed postings array follows the same lexicographic order.

use std::collections::BTreeMap;

/// Location and weight of a term in the index.
#[derive(Debug, Clone, PartialEq)]
pub struct TermInfo {
    /// Offset of the term's block in the packed postings array.
    pub offset: u32,
    /// Length of the block in array slots (two per document).
    pub len: u32,
    /// Pre-computed inverse document frequency.
    pub idf: f64,
}

impl TermInfo {
    /// Create new term info.
    pub fn new(offset: u32, len: u32, idf: f64) -> Self {
        TermInfo { offset, len, idf }
    }

    /// Number of documents in this term's postings block.
    pub fn doc_frequency(&self) -> u32 {
        self.len / 2
    }
}

/// A sorted-array term dictionary.
#[derive(Debug, Clone, Default)]
pub struct TermDictionary {
    /// Sorted terms.
    terms: Vec<String>,
    /// Term info for each term (parallel array).
    infos: Vec<TermInfo>,
}

impl TermDictionary {
    /// Create from a map of terms to term info.
    pub fn from_map(map: BTreeMap<String, TermInfo>) -> Self {
        let mut terms = Vec::with_capacity(map.len());
        let mut infos = Vec::with_capacity(map.len());

        for (term, info) in map {
            terms.push(term);
            infos.push(info);
        }

        TermDictionary { terms, infos }
    }

    /// Look up a term and return its info.
    pub fn get(&self, term: &str) -> Option<&TermInfo> {
        self.terms
            .binary_search_by(|probe| probe.as_str().cmp(term))
            .ok()
            .map(|index| &self.infos[index])
    }

    /// Check if a term is present.
    pub fn contains(&self, term: &str) -> bool {
        self.get(term).is_some()
    }

    /// Get the number of distinct terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate terms in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TermInfo)> {
        self.terms
            .iter()
            .zip(self.infos.iter())
            .map(|(term, info)| (term.as_str(), info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_dict(entries: &[(&str, u32, u32)]) -> TermDictionary {
        let map = entries
            .iter()
            .map(|&(term, offset, len)| (term.to_string(), TermInfo::new(offset, len, 1.0)))
            .collect();
        TermDictionary::from_map(map)
    }

    #[test]
    fn test_lookup() {
        let dict = build_dict(&[("fox", 0, 4), ("dog", 4, 2), ("cat", 6, 6)]);

        assert_eq!(dict.len(), 3);
        assert_eq!(dict.get("fox").unwrap().offset, 0);
        assert_eq!(dict.get("dog").unwrap().doc_frequency(), 1);
        assert!(dict.get("missing").is_none());
    }

    #[test]
    fn test_ordered_iteration() {
        let dict = build_dict(&[("fox", 0, 2), ("ant", 2, 2), ("owl", 4, 2)]);
        let terms: Vec<&str> = dict.iter().map(|(term, _)| term).collect();
        assert_eq!(terms, vec!["ant", "fox", "owl"]);
    }

    #[test]
    fn test_empty_dictionary() {
        let dict = TermDictionary::default();
        assert!(dict.is_empty());
        assert!(dict.get("anything").is_none());
    }
}
