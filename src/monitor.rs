//! Ready-made composition of history log, event bus, service and registry.

use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::events::BroadcastEventBus;
use crate::service::FailedDownloadService;
use crate::tracking::TrackedDownloadRegistry;
use crate::tracking::registry::SharedTrackedDownload;
use crate::types::Event;

/// Outcome of one polling tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Active downloads visited
    pub checked: usize,
    /// Downloads moved to `FailedPending` during this tick
    pub flagged: usize,
    /// Failure notifications published during this tick
    pub published: usize,
}

/// Failure monitor (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct FailureMonitor {
    /// History log, public so hosts can record grabs and clean up
    pub db: Arc<Database>,
    events: Arc<BroadcastEventBus>,
    service: FailedDownloadService,
    tracked: TrackedDownloadRegistry,
}

impl FailureMonitor {
    /// Create a new FailureMonitor
    ///
    /// Opens (and migrates) the history database, sets up the event
    /// broadcast channel and starts with no tracked downloads.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let db = Arc::new(Database::new(&config.persistence.database_path).await?);
        let events = Arc::new(BroadcastEventBus::new(config.events.channel_capacity));
        let service = FailedDownloadService::new(db.clone(), events.clone(), &config.failures);

        tracing::info!(
            database = %config.persistence.database_path.display(),
            deduplicate = config.failures.deduplicate,
            "Failure monitor initialized"
        );

        Ok(Self {
            db,
            events,
            service,
            tracked: TrackedDownloadRegistry::new(),
        })
    }

    /// Subscribe to failure notifications
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// The detection service, for manual failures and custom polling loops
    pub fn service(&self) -> &FailedDownloadService {
        &self.service
    }

    /// Tracked downloads owned by this monitor
    pub fn tracked(&self) -> &TrackedDownloadRegistry {
        &self.tracked
    }

    /// Run one polling tick over every active tracked download
    ///
    /// Each download gets `check` followed by `process_failed` while its
    /// lock is held. Downloads are handled concurrently. An error on one
    /// download does not stop the others; the first error is returned once
    /// all of them were visited.
    pub async fn poll(&self) -> Result<PollSummary> {
        let active = self.tracked.active().await;
        let outcomes = join_all(active.iter().map(|entry| self.poll_one(entry))).await;

        let mut summary = PollSummary {
            checked: active.len(),
            ..Default::default()
        };
        let mut first_error = None;

        for outcome in outcomes {
            match outcome {
                Ok((flagged, published)) => {
                    summary.flagged += usize::from(flagged);
                    summary.published += usize::from(published);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failure check failed for tracked download");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }

    async fn poll_one(&self, entry: &SharedTrackedDownload) -> Result<(bool, bool)> {
        let mut tracked = entry.lock().await;
        let flagged = self.service.check(&mut tracked).await?;
        let published = self.service.process_failed(&mut tracked).await?;
        Ok((flagged, published))
    }

    /// Close the history database
    ///
    /// Clones of this monitor share the pool and stop working as well.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down failure monitor");
        self.db.close().await;
    }
}
