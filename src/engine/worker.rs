//! Background scoring worker.
//!
//! Each index handle owns at most one worker: a named OS thread holding
//! a shared reference to the frozen index state and draining a single
//! request channel. Requests are handled strictly in submission order.
//! The thread never touches the async runtime; replies go back over
//! per-request oneshot channels whose receivers may already be gone.

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use ahash::AHashSet;
use tokio::sync::{mpsc, oneshot};

use crate::error::{Result, YariError};
use crate::index::IndexState;
use crate::search::{scorer, SearchHit};

/// Capacity of the worker's request channel.
const REQUEST_CHANNEL_CAPACITY: usize = 64;

/// A message sent to the scoring worker.
pub(crate) enum WorkerRequest {
    /// Score a query and reply with ranked hits.
    Search {
        query: String,
        limit: usize,
        allowed: Option<AHashSet<u32>>,
        stop_words: Option<HashSet<String>>,
        reply: oneshot::Sender<Result<Vec<SearchHit>>>,
    },
    /// Stop the worker after closing its request channel.
    Shutdown { ack: oneshot::Sender<()> },
}

/// Spawn the worker thread.
///
/// The thread opens its request channel and completes the handshake by
/// sending the channel's send end over `init_tx`; it exits on shutdown
/// or when every send end is dropped.
pub(crate) fn spawn(
    state: Arc<IndexState>,
    init_tx: oneshot::Sender<mpsc::Sender<WorkerRequest>>,
) -> std::io::Result<()> {
    thread::Builder::new()
        .name("yari-worker".to_string())
        .spawn(move || {
            let (sender, mut requests) = mpsc::channel(REQUEST_CHANNEL_CAPACITY);
            if init_tx.send(sender).is_err() {
                // Handshake abandoned before completion.
                return;
            }
            run(&state, &mut requests);
        })
        .map(|_| ())
}

fn run(state: &IndexState, requests: &mut mpsc::Receiver<WorkerRequest>) {
    while let Some(request) = requests.blocking_recv() {
        match request {
            WorkerRequest::Search {
                query,
                limit,
                allowed,
                stop_words,
                reply,
            } => {
                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    scorer::search(state, &query, limit, allowed.as_ref(), stop_words.as_ref())
                }))
                .map_err(|panic| {
                    let message = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "scoring panicked".to_string());
                    YariError::internal(message)
                });

                // The caller may have been cancelled; a dropped
                // receiver is not an error here.
                let _ = reply.send(outcome);
            }
            WorkerRequest::Shutdown { ack } => {
                requests.close();
                let _ = ack.send(());
                break;
            }
        }
    }
}
