//! Monitor setup and history/client fixtures

use failed_downloads::{
    Config, DOWNLOAD_CLIENT, DownloadClientItem, DownloadFailedEvent, DownloadItemStatus, Event,
    FailureMonitor, HistoryEventType, HistoryId, NewHistoryRecord, PersistenceConfig,
};
use std::collections::HashMap;
use tempfile::TempDir;
use tokio::sync::broadcast;

/// Monitor backed by a temporary history database.
/// The tempdir must be kept alive for the duration of the test.
pub struct TestMonitor {
    pub monitor: FailureMonitor,
    pub events: broadcast::Receiver<Event>,
    pub _temp_dir: TempDir,
}

/// Create a monitor with default settings in a fresh temp directory
pub async fn create_monitor() -> TestMonitor {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = Config {
        persistence: PersistenceConfig {
            database_path: temp_dir.path().join("history.db"),
        },
        ..Default::default()
    };

    let monitor = FailureMonitor::new(config).await.unwrap();
    let events = monitor.subscribe();

    TestMonitor {
        monitor,
        events,
        _temp_dir: temp_dir,
    }
}

impl TestMonitor {
    /// Record a grab of `episode_id` for `correlation_id`
    pub async fn grab(&self, correlation_id: &str, episode_id: i64) -> HistoryId {
        self.monitor
            .db
            .insert_history(&history(
                correlation_id,
                HistoryEventType::Grabbed,
                episode_id,
            ))
            .await
            .unwrap()
    }

    /// Drain every failure notification received so far
    pub fn published(&mut self) -> Vec<DownloadFailedEvent> {
        let mut out = Vec::new();
        while let Ok(Event::DownloadFailed(event)) = self.events.try_recv() {
            out.push(event);
        }
        out
    }
}

/// History record of series 42 for one episode
pub fn history(
    correlation_id: &str,
    event_type: HistoryEventType,
    episode_id: i64,
) -> NewHistoryRecord {
    NewHistoryRecord {
        correlation_id: Some(correlation_id.to_string()),
        event_type,
        series_id: 42,
        episode_id,
        quality: "WEBDL-1080p".to_string(),
        source_title: "Series.Title.S02.1080p.WEB-DL".to_string(),
        language: "English".to_string(),
        data: HashMap::from([(DOWNLOAD_CLIENT.to_string(), "NZBGet".to_string())]),
        date: chrono::Utc::now().timestamp(),
    }
}

/// Client status snapshot for `correlation_id`
pub fn client_item(
    correlation_id: &str,
    encrypted: bool,
    status: DownloadItemStatus,
    message: Option<&str>,
) -> DownloadClientItem {
    DownloadClientItem {
        download_id: correlation_id.to_string(),
        title: "Series.Title.S02.1080p.WEB-DL".to_string(),
        download_client: "NZBGet".to_string(),
        is_encrypted: encrypted,
        status,
        message: message.map(String::from),
    }
}
