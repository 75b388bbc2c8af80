//! In-flight request tracking for loading indicators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

/// Multiset of in-flight request keys.
///
/// Identical keys are counted per occurrence, so two concurrent
/// `GET /profile` calls keep the key loading until both finish. The
/// aggregate flag is recomputed under the same lock as the mutation and
/// published on a `watch` channel.
///
/// # Example
/// ```
/// use insurly::loading::RequestTracker;
///
/// let tracker = RequestTracker::new();
/// tracker.start_loading("get_/profile");
/// assert!(tracker.is_any_loading());
/// tracker.stop_loading("get_/profile");
/// assert!(!tracker.is_any_loading());
/// ```
#[derive(Debug)]
pub struct RequestTracker {
    active: Mutex<HashMap<String, usize>>,
    any_tx: watch::Sender<bool>,
}

impl Default for RequestTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestTracker {
    pub fn new() -> Self {
        let (any_tx, _) = watch::channel(false);
        Self {
            active: Mutex::new(HashMap::new()),
            any_tx,
        }
    }

    /// Add one occurrence of `key`.
    pub fn start_loading(&self, key: &str) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        *active.entry(key.to_string()).or_insert(0) += 1;
        self.publish(!active.is_empty());
    }

    /// Remove one occurrence of `key`. Unknown keys are ignored.
    pub fn stop_loading(&self, key: &str) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(count) = active.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                active.remove(key);
            }
        }
        self.publish(!active.is_empty());
    }

    /// Whether at least one occurrence of `key` is in flight.
    pub fn is_loading(&self, key: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Whether anything is in flight.
    pub fn is_any_loading(&self) -> bool {
        *self.any_tx.borrow()
    }

    /// Total outstanding occurrences across all keys.
    pub fn active_count(&self) -> usize {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }

    /// Subscribe to the aggregate loading flag.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.any_tx.subscribe()
    }

    /// Start `key` and stop it again when the returned guard drops.
    pub fn track(self: &Arc<Self>, key: impl Into<String>) -> LoadingGuard {
        let key = key.into();
        self.start_loading(&key);
        LoadingGuard {
            tracker: Arc::clone(self),
            key,
        }
    }

    fn publish(&self, loading: bool) {
        self.any_tx.send_if_modified(|current| {
            if *current == loading {
                false
            } else {
                *current = loading;
                true
            }
        });
    }
}

/// Keeps one occurrence of a key loading for as long as it lives.
#[derive(Debug)]
#[must_use = "the key stops loading as soon as the guard is dropped"]
pub struct LoadingGuard {
    tracker: Arc<RequestTracker>,
    key: String,
}

impl LoadingGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.tracker.stop_loading(&self.key);
    }
}
