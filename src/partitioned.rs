//! Partitioned indexes: one independent sub-index per shard key.
//!
//! Documents are bucketed by a caller-supplied key function and each
//! bucket becomes its own [`SearchIndex`] with IDF computed over that
//! bucket alone. Multi-shard searches fan out concurrently and merge by
//! rank; with a handful of shards the concat-and-sort merge is cheaper
//! than a k-way merge.

use futures::future::join_all;

use crate::document::DocumentInput;
use crate::engine::{BuildConfig, SearchIndex, SearchOptions};
use crate::error::{Result, YariError};
use crate::search::SearchHit;

/// A family of per-partition indexes sharing one configuration.
///
/// # Examples
///
/// ```
/// use yari::{BuildConfig, DocumentInput, PartitionedIndex};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> yari::Result<()> {
/// let docs = vec![
///     DocumentInput::from("rust ownership rules"),
///     DocumentInput::from("rust lifetime elision"),
///     DocumentInput::from("java generics guide"),
/// ];
/// let index = PartitionedIndex::build(
///     docs,
///     |doc| doc.text().split(' ').next().unwrap_or("misc").to_string(),
///     BuildConfig::default(),
/// )
/// .await?;
///
/// assert_eq!(index.partition_keys(), vec!["rust", "java"]);
/// let hits = index.search_in("rust", "ownership", 10).await?;
/// assert_eq!(hits.len(), 1);
/// index.dispose().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PartitionedIndex {
    /// Shards in first-seen key order.
    shards: Vec<(String, SearchIndex)>,
}

impl PartitionedIndex {
    /// Bucket `docs` by `partition_by` and build one index per bucket.
    ///
    /// Buckets keep corpus order internally, so doc ids within a shard
    /// follow the original iteration order. Fails with `EmptyCorpus`
    /// when `docs` is empty.
    pub async fn build<F>(
        docs: Vec<DocumentInput>,
        partition_by: F,
        config: BuildConfig,
    ) -> Result<PartitionedIndex>
    where
        F: Fn(&DocumentInput) -> String,
    {
        if docs.is_empty() {
            return Err(YariError::EmptyCorpus);
        }

        let mut buckets: Vec<(String, Vec<DocumentInput>)> = Vec::new();
        for doc in docs {
            let key = partition_by(&doc);
            match buckets.iter_mut().find(|(existing, _)| *existing == key) {
                Some((_, bucket)) => bucket.push(doc),
                None => buckets.push((key, vec![doc])),
            }
        }

        let builds = buckets.into_iter().map(|(key, bucket)| {
            let config = config.clone();
            async move {
                let index = SearchIndex::build(bucket, config).await?;
                Ok::<_, YariError>((key, index))
            }
        });

        let shards = join_all(builds)
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        Ok(PartitionedIndex { shards })
    }

    /// Search a single shard; an absent key yields an empty list.
    pub async fn search_in(&self, key: &str, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        if limit < 1 {
            return Err(YariError::InvalidLimit(limit));
        }

        match self.shard(key) {
            Some(index) => index.search(query, SearchOptions::with_limit(limit)).await,
            None => Ok(Vec::new()),
        }
    }

    /// Search several shards concurrently and merge by rank.
    ///
    /// Each present shard runs with the full `limit` (not a reduced
    /// per-shard share); merged results are sorted by descending score
    /// with ascending doc id on ties and truncated to `limit`. Absent
    /// keys contribute nothing.
    pub async fn search_many(
        &self,
        keys: &[&str],
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        if limit < 1 {
            return Err(YariError::InvalidLimit(limit));
        }

        let searches = keys
            .iter()
            .filter_map(|key| self.shard(key))
            .map(|index| index.search(query, SearchOptions::with_limit(limit)));

        let mut merged: Vec<SearchHit> = Vec::new();
        for outcome in join_all(searches).await {
            merged.extend(outcome?);
        }

        // Stable sort: full ties keep the caller's key order.
        merged.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        merged.truncate(limit);
        Ok(merged)
    }

    /// Dispose every sub-index concurrently.
    ///
    /// Completes once all shards are disposed; idempotent like the
    /// underlying handles.
    pub async fn dispose(&self) {
        join_all(self.shards.iter().map(|(_, index)| index.dispose())).await;
    }

    /// Shard keys in first-seen order.
    pub fn partition_keys(&self) -> Vec<&str> {
        self.shards.iter().map(|(key, _)| key.as_str()).collect()
    }

    /// Number of documents in one shard, if present.
    pub fn partition_doc_count(&self, key: &str) -> Option<usize> {
        self.shard(key).map(SearchIndex::doc_count)
    }

    fn shard(&self, key: &str) -> Option<&SearchIndex> {
        self.shards
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, index)| index)
    }
}
