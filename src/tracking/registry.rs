//! Collection of live tracked downloads, keyed by correlation id.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::{DownloadClientItem, TrackedDownload};

/// Shared handle to one tracked download
///
/// The mutex is the per-download exclusive section: whoever holds it may run
/// `check` / `process_failed` without another task interleaving.
pub type SharedTrackedDownload = Arc<Mutex<TrackedDownload>>;

/// Live tracked downloads owned by the polling loop
///
/// The map lock is only held while looking entries up, never while a
/// download is being checked, so slow history queries for one download do
/// not block the others.
#[derive(Clone, Default)]
pub struct TrackedDownloadRegistry {
    entries: Arc<RwLock<HashMap<String, SharedTrackedDownload>>>,
}

impl TrackedDownloadRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `item`, or refresh the snapshot of an already tracked download
    pub async fn track(&self, item: DownloadClientItem) -> SharedTrackedDownload {
        let existing = self.entries.read().await.get(&item.download_id).cloned();
        if let Some(entry) = existing {
            entry.lock().await.update_item(item);
            return entry;
        }

        let mut entries = self.entries.write().await;
        // another task may have inserted it between the two locks
        if let Some(entry) = entries.get(&item.download_id).cloned() {
            drop(entries);
            entry.lock().await.update_item(item);
            return entry;
        }

        tracing::debug!(correlation_id = %item.download_id, "Tracking new download");
        let key = item.download_id.clone();
        let entry = Arc::new(Mutex::new(TrackedDownload::new(item)));
        entries.insert(key, entry.clone());
        entry
    }

    /// Look up a tracked download
    pub async fn get(&self, correlation_id: &str) -> Option<SharedTrackedDownload> {
        self.entries.read().await.get(correlation_id).cloned()
    }

    /// Stop tracking a download
    pub async fn remove(&self, correlation_id: &str) -> Option<SharedTrackedDownload> {
        self.entries.write().await.remove(correlation_id)
    }

    /// Number of tracked downloads, terminal ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether nothing is tracked
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Tracked downloads that have not reached a terminal state
    pub async fn active(&self) -> Vec<SharedTrackedDownload> {
        let entries: Vec<_> = self.entries.read().await.values().cloned().collect();

        let mut active = Vec::with_capacity(entries.len());
        for entry in entries {
            if !entry.lock().await.state().is_terminal() {
                active.push(entry);
            }
        }
        active
    }
}
