//! Cache-fill orchestration for the menu catalog.
//!
//! The store is hydrated from the remote source at most once: a populated
//! store short-circuits with zero network calls, and concurrent callers of
//! an in-flight hydration share a single attempt and a single outcome.

use std::fmt;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{ApiError, CatalogSource};
use crate::models::MenuItem;
use crate::store::{MenuStore, StoreError};

/// Why a hydration pass failed.
#[derive(Debug, thiserror::Error)]
pub enum SyncErrorKind {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Remote(#[from] ApiError),
}

/// Error returned by [`CatalogSync::ensure_populated`].
///
/// Cloneable, so every caller awaiting a shared hydration flight can
/// observe the same failure.
#[derive(Debug, Clone)]
pub struct SyncError(Arc<SyncErrorKind>);

impl SyncError {
    pub fn kind(&self) -> &SyncErrorKind {
        &self.0
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&*self.0)
    }
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        Self(Arc::new(SyncErrorKind::Store(err)))
    }
}

impl From<ApiError> for SyncError {
    fn from(err: ApiError) -> Self {
        Self(Arc::new(SyncErrorKind::Remote(err)))
    }
}

type HydrateFuture = Shared<BoxFuture<'static, Result<Vec<MenuItem>, SyncError>>>;

/// Composes the store and the remote source into a single
/// "ensure populated" operation that owns the cache-fill policy.
pub struct CatalogSync<S> {
    store: MenuStore,
    source: Arc<S>,
    flight: Mutex<Option<HydrateFuture>>,
}

impl<S: CatalogSource + 'static> CatalogSync<S> {
    pub fn new(store: MenuStore, source: S) -> Self {
        Self {
            store,
            source: Arc::new(source),
            flight: Mutex::new(None),
        }
    }

    /// The store this orchestrator fills.
    pub fn store(&self) -> &MenuStore {
        &self.store
    }

    /// The remote source this orchestrator hydrates from.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Return the full catalog, hydrating from the remote source only if
    /// the local store is empty. A non-empty store means zero network
    /// calls; this is the offline-capable path.
    ///
    /// While a hydration is in flight, additional callers join it instead
    /// of starting their own, and all of them see the one attempt's outcome.
    pub async fn ensure_populated(&self) -> Result<Vec<MenuItem>, SyncError> {
        let existing = self.store.select_all().await?;
        if !existing.is_empty() {
            debug!(
                count = existing.len(),
                "catalog already populated, skipping remote fetch"
            );
            return Ok(existing);
        }

        let flight = {
            let mut slot = self.flight.lock().await;
            match slot.as_ref() {
                Some(flight) => {
                    debug!("joining in-flight hydration");
                    flight.clone()
                }
                None => {
                    let store = self.store.clone();
                    let source = Arc::clone(&self.source);
                    let flight: HydrateFuture =
                        async move { Self::hydrate(store, source).await }.boxed().shared();
                    *slot = Some(flight.clone());
                    flight
                }
            }
        };

        let result = flight.await;

        // Clear the slot so a later call (after a reset, or after a failed
        // attempt) can start a fresh flight. Late joiners already hold
        // their own clone of this one.
        self.flight.lock().await.take();

        result
    }

    /// One hydration pass: fetch, insert sequentially in document order,
    /// re-read. An insert failure aborts the pass and is reported; records
    /// committed before it remain in the store, and no retry happens here.
    async fn hydrate(store: MenuStore, source: Arc<S>) -> Result<Vec<MenuItem>, SyncError> {
        info!("menu store is empty, hydrating from remote catalog");

        let incoming = match source.fetch_catalog().await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "catalog fetch failed, store left empty");
                return Err(e.into());
            }
        };

        for item in incoming {
            store.insert(item).await?;
        }

        let items = store.select_all().await?;
        info!(count = items.len(), "catalog hydrated");
        Ok(items)
    }
}

// ============================================================================
// Tests
// ============================================================================
