//! Automatic failure detection: `check` then `process_failed`.
//!
//! Detection and action are split. `check` only flags a download as
//! `FailedPending`; nothing is published until `process_failed` runs, so a
//! caller can inspect downloads that are about to fail before any side effect.

use crate::error::Result;
use crate::tracking::{DownloadClientItem, DownloadItemStatus, TrackedDownload, TrackedDownloadState};

use super::{
    ENCRYPTED_DOWNLOAD_DETECTED, FAILED_DOWNLOAD_DETECTED, FailedDownloadService,
    NOT_GRABBED_WARNING,
};

/// Pick the failure reason for a client status snapshot
///
/// Encryption wins over everything, then an explicit client failure message,
/// then the generic message.
pub fn failure_message(item: &DownloadClientItem) -> String {
    if item.is_encrypted {
        return ENCRYPTED_DOWNLOAD_DETECTED.to_string();
    }

    if item.status == DownloadItemStatus::Failed
        && let Some(message) = item.message()
    {
        return message.to_string();
    }

    FAILED_DOWNLOAD_DETECTED.to_string()
}

impl FailedDownloadService {
    /// Detection pass for one tracked download
    ///
    /// Only downloads still in `Downloading` are looked at. A download that is
    /// encrypted or reported failed moves to `FailedPending` if it has grab
    /// history; otherwise a warning is recorded and the state is left alone,
    /// so downloads this application did not start are never failed.
    ///
    /// Returns true if the download moved to `FailedPending`.
    pub async fn check(&self, tracked: &mut TrackedDownload) -> Result<bool> {
        if tracked.state() != TrackedDownloadState::Downloading {
            return Ok(false);
        }

        let item = tracked.item();
        if !item.is_encrypted && item.status != DownloadItemStatus::Failed {
            return Ok(false);
        }

        let grabbed = self.grabbed_history(tracked.correlation_id()).await?;
        if grabbed.is_empty() {
            tracked.warn(NOT_GRABBED_WARNING);
            return Ok(false);
        }

        tracked.transition(TrackedDownloadState::FailedPending)?;
        tracing::info!(
            correlation_id = %tracked.correlation_id(),
            encrypted = tracked.item().is_encrypted,
            grabs = grabbed.len(),
            "Download failure detected, pending notification"
        );

        Ok(true)
    }

    /// Finalization pass for one tracked download
    ///
    /// Only downloads in `FailedPending` are processed, which makes repeated
    /// calls harmless: after the first successful call the state is `Failed`.
    /// Grab history is looked up again because it may have been cleaned up
    /// since `check` ran; without it the download stays `FailedPending`.
    ///
    /// Returns true if a notification was published.
    pub async fn process_failed(&self, tracked: &mut TrackedDownload) -> Result<bool> {
        if tracked.state() != TrackedDownloadState::FailedPending {
            return Ok(false);
        }

        let grabbed = self.grabbed_history(tracked.correlation_id()).await?;
        if grabbed.is_empty() {
            tracing::debug!(
                correlation_id = %tracked.correlation_id(),
                "Grab history disappeared, leaving download pending"
            );
            return Ok(false);
        }

        let message = failure_message(tracked.item());

        tracked.transition(TrackedDownloadState::Failed)?;
        self.publish_failure(&grabbed, &message, Some(&*tracked))
            .await
    }
}
