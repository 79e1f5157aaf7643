//! Failure detection and notification.
//!
//! [`FailedDownloadService`] methods are organized by entry point:
//! - [`detection`] - `check` / `process_failed`, driven by the polling loop
//! - [`manual`] - operator-initiated `mark_as_failed*`
//! - [`publish`] - notification construction and de-duplication

mod detection;
mod manual;
mod publish;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use detection::failure_message;
pub use publish::{FailureLedger, build_failure_event};

use std::sync::Arc;

use crate::config::FailureConfig;
use crate::error::Result;
use crate::events::EventBus;
use crate::history::HistoryLog;
use crate::types::{HistoryEventType, HistoryRecord};

/// Message for failures marked by an operator
pub const MANUALLY_MARKED_AS_FAILED: &str = "Manually marked as failed";
/// Message when the download client reports a password-protected payload
pub const ENCRYPTED_DOWNLOAD_DETECTED: &str = "Encrypted download detected";
/// Message when the download client reports a failure without details
pub const FAILED_DOWNLOAD_DETECTED: &str = "Failed download detected";
/// Diagnostic recorded for failing downloads that have no grab history
pub const NOT_GRABBED_WARNING: &str = "Download wasn't grabbed by this application, skipping";

/// Detects failed downloads and publishes failure notifications
///
/// Cloneable: the history log, event bus and de-duplication ledger are all
/// shared behind `Arc`.
#[derive(Clone)]
pub struct FailedDownloadService {
    history: Arc<dyn HistoryLog>,
    events: Arc<dyn EventBus>,
    /// None when de-duplication is disabled
    ledger: Option<Arc<FailureLedger>>,
}

impl FailedDownloadService {
    /// Create a service over the given history log and event bus
    pub fn new(
        history: Arc<dyn HistoryLog>,
        events: Arc<dyn EventBus>,
        config: &FailureConfig,
    ) -> Self {
        let ledger = config
            .deduplicate
            .then(|| Arc::new(FailureLedger::new(config.dedup_capacity)));

        Self {
            history,
            events,
            ledger,
        }
    }

    /// Grab records for a download, oldest first (empty if it was never grabbed)
    async fn grabbed_history(&self, correlation_id: &str) -> Result<Vec<HistoryRecord>> {
        self.history
            .find_by_correlation(correlation_id, HistoryEventType::Grabbed)
            .await
    }
}
