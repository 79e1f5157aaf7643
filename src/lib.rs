//! # failed-downloads
//!
//! Failure detection and notification for downloads tracked by a media
//! automation backend.
//!
//! ## Design Philosophy
//!
//! failed-downloads is designed to be:
//! - **Idempotent** - Detection runs on every poll, notifications go out once
//! - **Conservative** - Downloads without grab history are never failed
//! - **Library-first** - No polling loop, no UI; the host owns the cadence
//! - **Event-driven** - Consumers subscribe to failure events and decide what to do
//!
//! ## Quick Start
//!
//! ```no_run
//! use failed_downloads::{Config, DownloadClientItem, DownloadItemStatus, FailureMonitor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let monitor = FailureMonitor::new(Config::default()).await?;
//!
//!     // Subscribe to failure notifications
//!     let mut events = monitor.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     // On every poll of the download client
//!     monitor
//!         .tracked()
//!         .track(DownloadClientItem {
//!             download_id: "SABnzbd_nzo_abc".to_string(),
//!             title: "Show.S01.720p.HDTV".to_string(),
//!             download_client: "Sabnzbd".to_string(),
//!             is_encrypted: true,
//!             status: DownloadItemStatus::Downloading,
//!             message: None,
//!         })
//!         .await;
//!     monitor.poll().await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// History database
pub mod db;
/// Error types
pub mod error;
/// Event bus
pub mod events;
/// History log port
pub mod history;
/// Composed monitor with polling tick
pub mod monitor;
/// Failure detection and notification
pub mod service;
/// Tracked download state
pub mod tracking;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, EventConfig, FailureConfig, PersistenceConfig};
pub use db::{Database, NewHistoryRecord};
pub use error::{DatabaseError, Error, HistoryError, Result};
pub use events::{BroadcastEventBus, EventBus};
pub use history::HistoryLog;
pub use monitor::{FailureMonitor, PollSummary};
pub use service::{
    ENCRYPTED_DOWNLOAD_DETECTED, FAILED_DOWNLOAD_DETECTED, FailedDownloadService,
    MANUALLY_MARKED_AS_FAILED, NOT_GRABBED_WARNING,
};
pub use tracking::{
    DownloadClientItem, DownloadItemStatus, TrackedDownload, TrackedDownloadRegistry,
    TrackedDownloadSnapshot, TrackedDownloadState, TrackedDownloadStatus,
};
pub use types::{
    DOWNLOAD_CLIENT, DownloadFailedEvent, Event, HistoryEventType, HistoryId, HistoryRecord,
};
