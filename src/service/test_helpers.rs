//! Shared test helpers for creating FailedDownloadService instances in tests.

use crate::config::FailureConfig;
use crate::db::{Database, NewHistoryRecord};
use crate::error::{DatabaseError, Error, Result};
use crate::events::{BroadcastEventBus, EventBus};
use crate::history::HistoryLog;
use crate::service::FailedDownloadService;
use crate::tracking::{DownloadClientItem, DownloadItemStatus, TrackedDownload};
use crate::types::{
    DOWNLOAD_CLIENT, DownloadFailedEvent, Event, HistoryEventType, HistoryId, HistoryRecord,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::tempdir;
use tokio::sync::broadcast;

/// Service wired to a throwaway SQLite history log and a broadcast bus.
/// The tempdir must be kept alive for the duration of the test.
pub(crate) struct TestService {
    pub(crate) service: FailedDownloadService,
    pub(crate) db: Arc<Database>,
    pub(crate) bus: Arc<BroadcastEventBus>,
    pub(crate) events: broadcast::Receiver<Event>,
    pub(crate) _temp_dir: tempfile::TempDir,
}

/// Helper to create a test service with default failure settings.
pub(crate) async fn create_test_service() -> TestService {
    create_test_service_with(FailureConfig::default()).await
}

/// Helper to create a test service with custom failure settings.
pub(crate) async fn create_test_service_with(config: FailureConfig) -> TestService {
    let temp_dir = tempdir().unwrap();
    let db = Arc::new(
        Database::new(&temp_dir.path().join("history.db"))
            .await
            .unwrap(),
    );
    let bus = Arc::new(BroadcastEventBus::new(64));
    let events = bus.subscribe();

    let service = FailedDownloadService::new(db.clone(), bus.clone(), &config);

    TestService {
        service,
        db,
        bus,
        events,
        _temp_dir: temp_dir,
    }
}

impl TestService {
    /// Insert one grab record and return its id
    pub(crate) async fn grab(&self, correlation_id: Option<&str>, episode_id: i64) -> HistoryId {
        self.db
            .insert_history(&grab_record(correlation_id, episode_id))
            .await
            .unwrap()
    }

    /// Everything published since the last drain
    pub(crate) fn published(&mut self) -> Vec<DownloadFailedEvent> {
        let mut out = Vec::new();
        while let Ok(Event::DownloadFailed(event)) = self.events.try_recv() {
            out.push(event);
        }
        out
    }
}

/// Grab record for one episode of series 7
pub(crate) fn grab_record(correlation_id: Option<&str>, episode_id: i64) -> NewHistoryRecord {
    NewHistoryRecord {
        correlation_id: correlation_id.map(String::from),
        event_type: HistoryEventType::Grabbed,
        series_id: 7,
        episode_id,
        quality: "HDTV-720p".to_string(),
        source_title: "Show.S01.720p.HDTV".to_string(),
        language: "English".to_string(),
        data: HashMap::from([(DOWNLOAD_CLIENT.to_string(), "Sabnzbd".to_string())]),
        date: chrono::Utc::now().timestamp(),
    }
}

/// Tracked download for `correlation_id` with the given client status
pub(crate) fn tracked(
    correlation_id: &str,
    encrypted: bool,
    status: DownloadItemStatus,
    message: Option<&str>,
) -> TrackedDownload {
    TrackedDownload::new(DownloadClientItem {
        download_id: correlation_id.to_string(),
        title: "Show.S01.720p.HDTV".to_string(),
        download_client: "Sabnzbd".to_string(),
        is_encrypted: encrypted,
        status,
        message: message.map(String::from),
    })
}

/// History log that is never reachable
pub(crate) struct UnreachableHistory;

#[async_trait]
impl HistoryLog for UnreachableHistory {
    async fn get_by_id(&self, _id: HistoryId) -> Result<HistoryRecord> {
        Err(Error::Database(DatabaseError::ConnectionFailed(
            "history log offline".to_string(),
        )))
    }

    async fn find_by_correlation(
        &self,
        _correlation_id: &str,
        _event_type: HistoryEventType,
    ) -> Result<Vec<HistoryRecord>> {
        Err(Error::Database(DatabaseError::ConnectionFailed(
            "history log offline".to_string(),
        )))
    }
}

/// Event bus that refuses every event
pub(crate) struct ClosedBus;

impl EventBus for ClosedBus {
    fn publish(&self, _event: Event) -> Result<()> {
        Err(Error::EventBus("bus closed".to_string()))
    }
}
