//! Operator-initiated failures.
//!
//! These paths never touch tracked downloads, so the notifications they
//! publish carry no tracked download back-reference.

use crate::error::Result;
use crate::types::HistoryId;

use super::{FailedDownloadService, MANUALLY_MARKED_AS_FAILED};

impl FailedDownloadService {
    /// Mark the download behind one history record as failed
    ///
    /// A record without a correlation id is published on its own. Otherwise
    /// every grab sharing its correlation id is included, so marking one
    /// episode of a season pack fails the whole pack.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::HistoryError::NotFound`] if `history_id` does not
    /// exist, and propagates history log and event bus errors.
    pub async fn mark_as_failed(&self, history_id: HistoryId) -> Result<bool> {
        let record = self.history.get_by_id(history_id).await?;

        let records = match record.correlation_id() {
            None => vec![record],
            Some(correlation_id) => {
                let grabbed = self.grabbed_history(correlation_id).await?;
                if grabbed.is_empty() {
                    tracing::warn!(
                        history_id = history_id.get(),
                        correlation_id,
                        "No grab history for manually failed record, nothing to publish"
                    );
                    return Ok(false);
                }
                grabbed
            }
        };

        tracing::info!(
            history_id = history_id.get(),
            records = records.len(),
            "Download manually marked as failed"
        );
        self.publish_failure(&records, MANUALLY_MARKED_AS_FAILED, None)
            .await
    }

    /// Mark a download as failed by its correlation id
    ///
    /// An unknown correlation id (never grabbed, or history already cleaned
    /// up) is a no-op, not an error. Returns true if a notification was
    /// published.
    pub async fn mark_as_failed_by_correlation(&self, correlation_id: &str) -> Result<bool> {
        let grabbed = self.grabbed_history(correlation_id).await?;
        if grabbed.is_empty() {
            tracing::debug!(correlation_id, "No grab history, nothing to mark as failed");
            return Ok(false);
        }

        tracing::info!(
            correlation_id,
            records = grabbed.len(),
            "Download manually marked as failed"
        );
        self.publish_failure(&grabbed, MANUALLY_MARKED_AS_FAILED, None)
            .await
    }
}
