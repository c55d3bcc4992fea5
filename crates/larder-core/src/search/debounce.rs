//! Deferred execution for rapidly repeated triggers.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

/// Coalesces rapid successive calls into one execution: each `schedule`
/// cancels the pending timer, and only the action from the last call
/// before a full quiet period actually runs.
///
/// The action itself is what gets deferred - nothing it would do, queries
/// included, starts until the timer fires. A cancelled action never runs.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any pending action with `action`, to run after `delay` of
    /// silence.
    pub fn schedule<F, Fut>(&self, delay: Duration, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action().await;
        });
        let previous = {
            let mut pending = self
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            pending.replace(handle)
        };
        if let Some(previous) = previous {
            trace!("rescheduled, aborting pending action");
            previous.abort();
        }
    }

    /// Drop the pending action, if any, without scheduling a replacement.
    pub fn cancel(&self) {
        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
