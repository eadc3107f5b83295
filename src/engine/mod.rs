//! The index handle: build, search, and lifecycle management.
//!
//! A [`SearchIndex`] owns the frozen index state and, lazily, one
//! background scoring worker. Concurrent first queries share a single
//! spawn; every awaitable phase races the dispose signal and resolves
//! `Cancelled` when it fires. `dispose` drains in-flight requests
//! before tearing the worker down and is idempotent.

pub(crate) mod worker;

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, watch, Notify, OnceCell};

use crate::document::{DocumentInput, FieldValue};
use crate::error::{Result, YariError};
use crate::index::builder::build_index;
use crate::index::{IndexState, IndexStats};
use crate::search::{feedback, SearchHit};
use worker::WorkerRequest;

/// Wall-clock budget for the whole spawn operation.
const SPAWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Wall-clock budget for the worker handshake.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Wall-clock budget for a single scoring reply.
const REPLY_TIMEOUT: Duration = Duration::from_secs(30);

/// Wall-clock budget for the shutdown acknowledgement.
const SHUTDOWN_ACK_TIMEOUT: Duration = Duration::from_secs(5);

/// Build-time configuration.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Metadata fields materialized for filtering; only these may
    /// appear in a search filter.
    pub index_fields: Vec<String>,
    /// Tokens excluded from term statistics during build.
    pub stop_words: HashSet<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            index_fields: vec!["filePath".to_string()],
            stop_words: HashSet::new(),
        }
    }
}

/// Default number of results returned by a search.
pub const DEFAULT_LIMIT: usize = 10;

/// Per-query options.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Maximum results returned; must be at least 1.
    pub limit: usize,
    /// Exact-match constraints per indexed field. A list value matches
    /// any of its elements; clauses across fields must all hold.
    pub filter: Option<HashMap<String, FieldValue>>,
    /// Tokens excluded from the query before scoring. Independent of
    /// the build-time stop set.
    pub stop_words: Option<HashSet<String>>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            limit: DEFAULT_LIMIT,
            filter: None,
            stop_words: None,
        }
    }
}

impl SearchOptions {
    /// Options with the given result limit.
    pub fn with_limit(limit: usize) -> Self {
        SearchOptions {
            limit,
            ..Default::default()
        }
    }
}

/// Options for feedback-expanded search.
#[derive(Debug, Clone)]
pub struct FeedbackOptions {
    /// Weight of the original query terms.
    pub alpha: f64,
    /// Weight of the relevant-document terms.
    pub beta: f64,
    /// Maximum results returned; must be at least 1.
    pub limit: usize,
}

impl Default for FeedbackOptions {
    fn default() -> Self {
        FeedbackOptions {
            alpha: 1.0,
            beta: 0.75,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Lifecycle of the index handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    /// Accepting queries; worker spawns lazily.
    Active,
    /// Dispose has begun; in-flight requests are draining.
    Disposing,
    /// Worker torn down; all further queries fail.
    Disposed,
}

/// An immutable BM25 index with its background scoring worker.
///
/// Built once over a fixed corpus; queries run against frozen state and
/// may be issued concurrently from many tasks. Dropping the handle
/// without `dispose` leaks no index data, but orderly shutdown of the
/// worker requires `dispose`.
pub struct SearchIndex {
    /// Frozen index state shared with the worker.
    state: Arc<IndexState>,
    /// Lazily-spawned worker; at most one per handle.
    worker: OnceCell<mpsc::Sender<WorkerRequest>>,
    /// Handle lifecycle, guarded for consistent transitions.
    lifecycle: Mutex<Lifecycle>,
    /// One-shot dispose signal observed by every waiter.
    dispose_tx: watch::Sender<bool>,
    dispose_rx: watch::Receiver<bool>,
    /// Number of submitted-but-unresolved requests.
    active: AtomicUsize,
    /// Signalled when `active` drops to zero.
    drained: Notify,
}

impl SearchIndex {
    /// Build an index over `docs`.
    ///
    /// Ids are assigned in iteration order from 0. Construction runs
    /// off the caller's scheduling loop. Fails with `EmptyCorpus` when
    /// `docs` is empty.
    pub async fn build(docs: Vec<DocumentInput>, config: BuildConfig) -> Result<SearchIndex> {
        if docs.is_empty() {
            return Err(YariError::EmptyCorpus);
        }

        let state = tokio::task::spawn_blocking(move || {
            build_index(docs, &config.index_fields, &config.stop_words)
        })
        .await
        .map_err(|e| YariError::internal(format!("index build task failed: {e}")))??;

        Ok(Self::from_state(Arc::new(state)))
    }

    /// Build from loosely-typed JSON corpus elements.
    ///
    /// Strings become text-only documents and objects become records;
    /// any other element fails with `InvalidDocument`.
    pub async fn build_from_json(
        values: Vec<serde_json::Value>,
        config: BuildConfig,
    ) -> Result<SearchIndex> {
        let docs = values
            .into_iter()
            .map(DocumentInput::from_json)
            .collect::<Result<Vec<_>>>()?;
        Self::build(docs, config).await
    }

    pub(crate) fn from_state(state: Arc<IndexState>) -> SearchIndex {
        let (dispose_tx, dispose_rx) = watch::channel(false);
        SearchIndex {
            state,
            worker: OnceCell::new(),
            lifecycle: Mutex::new(Lifecycle::Active),
            dispose_tx,
            dispose_rx,
            active: AtomicUsize::new(0),
            drained: Notify::new(),
        }
    }

    /// Execute a ranked top-k query.
    ///
    /// Fails with `InvalidLimit` for a zero limit, `UnknownField` for a
    /// filter naming an unindexed field, `Disposed` after dispose, and
    /// `Cancelled` when dispose interrupts the request in flight.
    /// Empty, whitespace-only, and out-of-vocabulary queries resolve to
    /// an empty list.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use yari::{BuildConfig, DocumentInput, FieldValue, Metadata, SearchIndex, SearchOptions};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> yari::Result<()> {
    /// let mut meta = Metadata::new();
    /// meta.insert("filePath".to_string(), FieldValue::from("guide/intro.md"));
    /// let docs = vec![
    ///     DocumentInput::with_meta("getting started guide", meta),
    ///     DocumentInput::from("unrelated notes"),
    /// ];
    /// let index = SearchIndex::build(docs, BuildConfig::default()).await?;
    ///
    /// let filter: HashMap<String, FieldValue> =
    ///     [("filePath".to_string(), FieldValue::from("guide/intro.md"))].into();
    /// let hits = index
    ///     .search(
    ///         "guide",
    ///         SearchOptions {
    ///             filter: Some(filter),
    ///             ..Default::default()
    ///         },
    ///     )
    ///     .await?;
    /// assert_eq!(hits.len(), 1);
    /// index.dispose().await;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn search(&self, query: &str, options: SearchOptions) -> Result<Vec<SearchHit>> {
        let limit = options.limit;
        if limit < 1 {
            return Err(YariError::InvalidLimit(limit));
        }
        if *self.lifecycle.lock() != Lifecycle::Active {
            return Err(YariError::Disposed);
        }

        let allowed = match &options.filter {
            Some(filter) => self.state.field_index().resolve_filter(filter)?,
            None => None,
        };

        let sender = self.worker_sender().await?;

        let _guard = RequestGuard::register(self);

        let (reply_tx, reply_rx) = oneshot::channel();
        let request = WorkerRequest::Search {
            query: query.to_string(),
            limit,
            allowed,
            stop_words: options.stop_words,
            reply: reply_tx,
        };
        sender
            .send(request)
            .await
            .map_err(|_| YariError::Disposed)?;

        let mut dispose_rx = self.dispose_rx.clone();
        tokio::select! {
            _ = dispose_rx.wait_for(|disposed| *disposed) => Err(YariError::Cancelled),
            reply = tokio::time::timeout(REPLY_TIMEOUT, reply_rx) => match reply {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => Err(YariError::internal("worker dropped the reply channel")),
                Err(_) => Err(YariError::WorkerTimeout("reply")),
            },
        }
    }

    /// Execute a query expanded with Rocchio-style relevance feedback.
    ///
    /// With no usable relevant documents this degrades to a plain
    /// search over the original query.
    pub async fn search_with_feedback(
        &self,
        query: &str,
        relevant: &[u32],
        options: FeedbackOptions,
    ) -> Result<Vec<SearchHit>> {
        if options.limit < 1 {
            return Err(YariError::InvalidLimit(options.limit));
        }

        let expanded =
            feedback::expand_query(&self.state, query, relevant, options.alpha, options.beta);
        let effective = expanded.as_deref().unwrap_or(query);

        self.search(effective, SearchOptions::with_limit(options.limit))
            .await
    }

    /// Tear down the worker after draining in-flight requests.
    ///
    /// Fires the dispose signal first, so pending waiters resolve with
    /// `Cancelled`; then waits, without a timeout, until every
    /// submitted request has resolved; finally performs the shutdown
    /// handshake with the worker (bounded by the ack budget). A second
    /// call returns immediately.
    pub async fn dispose(&self) {
        {
            let mut lifecycle = self.lifecycle.lock();
            if *lifecycle != Lifecycle::Active {
                return;
            }
            *lifecycle = Lifecycle::Disposing;
        }

        let _ = self.dispose_tx.send(true);

        loop {
            let drained = self.drained.notified();
            tokio::pin!(drained);
            // Register interest before the check so a decrement between
            // the load and the await is not lost.
            drained.as_mut().enable();
            if self.active.load(Ordering::Acquire) == 0 {
                break;
            }
            drained.await;
        }

        if let Some(sender) = self.worker.get() {
            let (ack_tx, ack_rx) = oneshot::channel();
            let shutdown = WorkerRequest::Shutdown { ack: ack_tx };
            if sender.send(shutdown).await.is_ok() {
                let _ = tokio::time::timeout(SHUTDOWN_ACK_TIMEOUT, ack_rx).await;
            }
        }

        *self.lifecycle.lock() = Lifecycle::Disposed;
    }

    /// Number of documents in the index.
    pub fn doc_count(&self) -> usize {
        self.state.doc_count()
    }

    /// Look up a document by id.
    pub fn doc(&self, id: u32) -> Option<&Arc<crate::document::Document>> {
        self.state.doc(id)
    }

    /// Summary statistics for the frozen index.
    pub fn stats(&self) -> IndexStats {
        self.state.stats()
    }

    /// Resolve the worker's send end, spawning the worker on first use.
    ///
    /// Concurrent callers share one spawn; a spawn that fails leaves
    /// the cell empty so a later query may retry.
    async fn worker_sender(&self) -> Result<mpsc::Sender<WorkerRequest>> {
        let mut dispose_rx = self.dispose_rx.clone();
        tokio::select! {
            _ = dispose_rx.wait_for(|disposed| *disposed) => Err(YariError::Cancelled),
            sender = self.worker.get_or_try_init(|| self.spawn_worker()) => sender.cloned(),
        }
    }

    async fn spawn_worker(&self) -> Result<mpsc::Sender<WorkerRequest>> {
        let handshake = async {
            let (init_tx, init_rx) = oneshot::channel();
            worker::spawn(Arc::clone(&self.state), init_tx)
                .map_err(|e| YariError::internal(format!("failed to spawn worker thread: {e}")))?;

            match tokio::time::timeout(HANDSHAKE_TIMEOUT, init_rx).await {
                Ok(Ok(sender)) => Ok(sender),
                Ok(Err(_)) => Err(YariError::internal("worker exited before handshake")),
                Err(_) => Err(YariError::WorkerTimeout("handshake")),
            }
        };

        match tokio::time::timeout(SPAWN_TIMEOUT, handshake).await {
            Ok(outcome) => outcome,
            Err(_) => Err(YariError::WorkerTimeout("spawn")),
        }
    }
}

impl std::fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchIndex")
            .field("docs", &self.state.doc_count())
            .field("terms", &self.state.dictionary().len())
            .field("lifecycle", &*self.lifecycle.lock())
            .finish()
    }
}

/// RAII registration of an in-flight request.
struct RequestGuard<'a> {
    handle: &'a SearchIndex,
}

impl<'a> RequestGuard<'a> {
    fn register(handle: &'a SearchIndex) -> Self {
        handle.active.fetch_add(1, Ordering::AcqRel);
        RequestGuard { handle }
    }
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        if self.handle.active.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.handle.drained.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[&str]) -> Vec<DocumentInput> {
        texts.iter().map(|t| DocumentInput::from(*t)).collect()
    }

    #[tokio::test]
    async fn test_build_and_search() {
        let index = SearchIndex::build(corpus(&["quick fox", "lazy dog"]), BuildConfig::default())
            .await
            .unwrap();

        let hits = index.search("fox", SearchOptions::default()).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, 0);

        index.dispose().await;
    }

    #[tokio::test]
    async fn test_empty_corpus_fails() {
        let result = SearchIndex::build(Vec::new(), BuildConfig::default()).await;
        assert_eq!(result.unwrap_err(), YariError::EmptyCorpus);
    }

    #[tokio::test]
    async fn test_zero_limit_rejected() {
        let index = SearchIndex::build(corpus(&["doc"]), BuildConfig::default())
            .await
            .unwrap();

        let result = index.search("doc", SearchOptions::with_limit(0)).await;
        assert_eq!(result.unwrap_err(), YariError::InvalidLimit(0));

        index.dispose().await;
    }

    #[tokio::test]
    async fn test_search_after_dispose_fails() {
        let index = SearchIndex::build(corpus(&["doc"]), BuildConfig::default())
            .await
            .unwrap();
        index.dispose().await;

        let result = index.search("doc", SearchOptions::default()).await;
        assert_eq!(result.unwrap_err(), YariError::Disposed);
    }

    #[tokio::test]
    async fn test_dispose_is_idempotent() {
        let index = SearchIndex::build(corpus(&["doc"]), BuildConfig::default())
            .await
            .unwrap();
        index.dispose().await;
        index.dispose().await;
    }

    #[tokio::test]
    async fn test_dispose_without_any_search() {
        let index = SearchIndex::build(corpus(&["doc"]), BuildConfig::default())
            .await
            .unwrap();
        // No worker was ever spawned; dispose must still complete.
        index.dispose().await;
    }

    #[tokio::test]
    async fn test_feedback_falls_back_without_relevant_docs() {
        let index = SearchIndex::build(
            corpus(&["machine learning", "cooking recipes"]),
            BuildConfig::default(),
        )
        .await
        .unwrap();

        let plain = index
            .search("learning", SearchOptions::default())
            .await
            .unwrap();
        let fed = index
            .search_with_feedback("learning", &[], FeedbackOptions::default())
            .await
            .unwrap();

        assert_eq!(plain.len(), fed.len());
        assert_eq!(plain[0].doc_id, fed[0].doc_id);

        index.dispose().await;
    }

    #[tokio::test]
    async fn test_build_from_json_mixed() {
        let values = vec![
            serde_json::json!("plain text doc"),
            serde_json::json!({ "text": "doc with meta", "filePath": "a/b.rs" }),
        ];
        let index = SearchIndex::build_from_json(values, BuildConfig::default())
            .await
            .unwrap();
        assert_eq!(index.doc_count(), 2);
        index.dispose().await;
    }

    #[tokio::test]
    async fn test_build_from_json_rejects_numbers() {
        let values = vec![serde_json::json!(42)];
        let result = SearchIndex::build_from_json(values, BuildConfig::default()).await;
        assert!(matches!(result, Err(YariError::InvalidDocument(_))));
    }
}
