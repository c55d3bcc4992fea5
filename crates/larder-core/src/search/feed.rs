//! Debounced, last-request-wins search over the menu store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::models::MenuItem;
use crate::store::MenuStore;

use super::Debouncer;

/// How long search input must stay quiet before a query runs.
/// Half a second absorbs per-keystroke churn without feeling laggy.
pub const SEARCH_DEBOUNCE_MS: u64 = 500;

/// Orders filter requests and discards stale results.
///
/// Requests are stamped when they are made, not when they finish, so the
/// request made last wins even if an earlier one resolves later.
#[derive(Debug, Default)]
struct ResultSequencer {
    next: AtomicU64,
    applied: Mutex<u64>,
}

impl ResultSequencer {
    /// Stamp a new request.
    fn begin(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Run `publish` iff `seq` is newer than the last applied request. The
    /// check and the publication happen under one lock so interleaved
    /// completions cannot land out of order.
    fn apply<F: FnOnce()>(&self, seq: u64, publish: F) -> bool {
        let mut applied = self.applied.lock().unwrap_or_else(PoisonError::into_inner);
        if seq <= *applied {
            return false;
        }
        *applied = seq;
        publish();
        true
    }
}

/// The search surface the UI drives: debounces raw input, queries the
/// store once input settles, and publishes the newest result set on a
/// watch channel.
///
/// In-flight queries are never cancelled; a stale one simply loses the
/// sequence check and its result is dropped.
pub struct SearchFeed {
    store: MenuStore,
    debouncer: Debouncer,
    delay: Duration,
    sequencer: Arc<ResultSequencer>,
    results_tx: watch::Sender<Vec<MenuItem>>,
    results_rx: watch::Receiver<Vec<MenuItem>>,
}

impl SearchFeed {
    pub fn new(store: MenuStore) -> Self {
        Self::with_delay(store, Duration::from_millis(SEARCH_DEBOUNCE_MS))
    }

    pub fn with_delay(store: MenuStore, delay: Duration) -> Self {
        let (results_tx, results_rx) = watch::channel(Vec::new());
        Self {
            store,
            debouncer: Debouncer::new(),
            delay,
            sequencer: Arc::new(ResultSequencer::default()),
            results_tx,
            results_rx,
        }
    }

    /// Subscribe to result snapshots.
    pub fn results(&self) -> watch::Receiver<Vec<MenuItem>> {
        self.results_rx.clone()
    }

    /// Record the latest input state. The query runs only once the input
    /// has been quiet for the configured delay; pending earlier inputs are
    /// dropped unexecuted, and only the newest completed result is
    /// published.
    pub fn set_filter(&self, categories: Vec<String>, query: String) {
        let seq = self.sequencer.begin();
        let store = self.store.clone();
        let sequencer = Arc::clone(&self.sequencer);
        let results_tx = self.results_tx.clone();

        self.debouncer.schedule(self.delay, move || async move {
            match store.filter(&categories, &query).await {
                Ok(items) => {
                    let applied = sequencer.apply(seq, || {
                        let _ = results_tx.send(items);
                    });
                    if applied {
                        debug!(seq, "filter result published");
                    } else {
                        debug!(seq, "stale filter result discarded");
                    }
                }
                Err(e) => warn!(error = %e, "menu filter failed"),
            }
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
