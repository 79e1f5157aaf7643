//! Tracked downloads
//!
//! A [`TrackedDownload`] is the in-memory view of one in-flight download: the
//! latest status snapshot reported by the download client, the lifecycle
//! state this crate drives, and a diagnostic log of warnings collected while
//! checking it. Nothing here is persisted.
//!
//! - [`registry`] - per-correlation-id collection owned by the polling loop

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

pub mod registry;

pub use registry::TrackedDownloadRegistry;

/// Status reported by the download client
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadItemStatus {
    /// Waiting in the client's queue
    Queued,
    /// Paused in the client
    Paused,
    /// Transferring data
    #[default]
    Downloading,
    /// Finished transferring
    Completed,
    /// Client gave up on the download
    Failed,
    /// Client reports a problem but keeps going
    Warning,
}

/// Snapshot of one download as reported by the download client
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadClientItem {
    /// Client-assigned id, used as the correlation id
    pub download_id: String,

    /// Title shown in the client
    pub title: String,

    /// Name of the download client instance
    pub download_client: String,

    /// Whether the client found the payload to be password protected
    pub is_encrypted: bool,

    /// Client-reported status
    pub status: DownloadItemStatus,

    /// Client-reported status message, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DownloadClientItem {
    /// Status message, or None when it is absent or blank
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

/// Lifecycle state of a tracked download
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedDownloadState {
    /// Still transferring (initial state)
    Downloading,
    /// Finished, waiting to be imported
    ImportPending,
    /// Import in progress
    Importing,
    /// Imported (terminal)
    Imported,
    /// Failure detected, notification not yet sent
    FailedPending,
    /// Failure notification sent (terminal)
    Failed,
    /// Ignored by the user (terminal)
    Ignored,
}

impl TrackedDownloadState {
    /// Lowercase name used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackedDownloadState::Downloading => "downloading",
            TrackedDownloadState::ImportPending => "import_pending",
            TrackedDownloadState::Importing => "importing",
            TrackedDownloadState::Imported => "imported",
            TrackedDownloadState::FailedPending => "failed_pending",
            TrackedDownloadState::Failed => "failed",
            TrackedDownloadState::Ignored => "ignored",
        }
    }

    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TrackedDownloadState::Imported
                | TrackedDownloadState::Failed
                | TrackedDownloadState::Ignored
        )
    }

    /// Whether `self -> next` is a forward edge of the lifecycle
    pub fn can_transition_to(&self, next: TrackedDownloadState) -> bool {
        use TrackedDownloadState::*;

        matches!(
            (self, next),
            (Downloading, ImportPending | FailedPending | Ignored)
                | (ImportPending, Importing | FailedPending)
                | (Importing, Imported | FailedPending)
                | (FailedPending, Failed)
        )
    }
}

impl fmt::Display for TrackedDownloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health summary of a tracked download
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackedDownloadStatus {
    /// Nothing to report
    #[default]
    Ok,
    /// At least one warning was recorded
    Warning,
}

/// One entry of a tracked download's diagnostic log
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedDownloadStatusMessage {
    /// Heading, usually the download title
    pub title: String,
    /// Individual diagnostic lines
    pub messages: Vec<String>,
}

/// In-memory state of one in-flight download
#[derive(Clone, Debug)]
pub struct TrackedDownload {
    correlation_id: String,
    item: DownloadClientItem,
    state: TrackedDownloadState,
    status: TrackedDownloadStatus,
    status_messages: Vec<TrackedDownloadStatusMessage>,
}

impl TrackedDownload {
    /// Start tracking a download in the `Downloading` state
    pub fn new(item: DownloadClientItem) -> Self {
        Self {
            correlation_id: item.download_id.clone(),
            item,
            state: TrackedDownloadState::Downloading,
            status: TrackedDownloadStatus::Ok,
            status_messages: Vec::new(),
        }
    }

    /// Correlation id assigned by the download client
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Latest client status snapshot
    pub fn item(&self) -> &DownloadClientItem {
        &self.item
    }

    /// Current lifecycle state
    pub fn state(&self) -> TrackedDownloadState {
        self.state
    }

    /// Current health status
    pub fn status(&self) -> TrackedDownloadStatus {
        self.status
    }

    /// Diagnostic log, oldest first
    pub fn status_messages(&self) -> &[TrackedDownloadStatusMessage] {
        &self.status_messages
    }

    /// Replace the client status snapshot
    ///
    /// The correlation id is fixed for the life of the download, so a snapshot
    /// for a different id is ignored. The lifecycle state is never touched.
    pub fn update_item(&mut self, item: DownloadClientItem) {
        if item.download_id != self.correlation_id {
            tracing::warn!(
                correlation_id = %self.correlation_id,
                other = %item.download_id,
                "Ignoring status snapshot for a different download"
            );
            return;
        }
        self.item = item;
    }

    /// Move to `next`, refusing anything but a forward lifecycle edge
    pub fn transition(&mut self, next: TrackedDownloadState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                correlation_id: self.correlation_id.clone(),
                from: self.state,
                to: next,
            });
        }

        tracing::debug!(
            correlation_id = %self.correlation_id,
            from = %self.state,
            to = %next,
            "Tracked download state changed"
        );
        self.state = next;
        Ok(())
    }

    /// Record a warning in the diagnostic log
    ///
    /// A warning identical to the newest entry is not recorded again, so
    /// polling a download that stays in the same condition logs it once.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        let repeated = self.status_messages.last().is_some_and(|last| {
            last.title == self.item.title && last.messages == [message.as_str()]
        });
        if repeated {
            return;
        }

        tracing::warn!(
            correlation_id = %self.correlation_id,
            title = %self.item.title,
            "{}",
            message
        );

        self.status = TrackedDownloadStatus::Warning;
        self.status_messages.push(TrackedDownloadStatusMessage {
            title: self.item.title.clone(),
            messages: vec![message],
        });
    }

    /// Serializable copy attached to failure notifications
    pub fn snapshot(&self) -> TrackedDownloadSnapshot {
        TrackedDownloadSnapshot {
            correlation_id: self.correlation_id.clone(),
            item: self.item.clone(),
            state: self.state,
            status: self.status,
            status_messages: self.status_messages.clone(),
        }
    }
}

/// Point-in-time copy of a [`TrackedDownload`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackedDownloadSnapshot {
    /// Correlation id assigned by the download client
    pub correlation_id: String,
    /// Client status snapshot
    pub item: DownloadClientItem,
    /// Lifecycle state when the copy was taken
    pub state: TrackedDownloadState,
    /// Health status when the copy was taken
    pub status: TrackedDownloadStatus,
    /// Diagnostic log when the copy was taken
    pub status_messages: Vec<TrackedDownloadStatusMessage>,
}
