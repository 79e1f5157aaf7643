//! Failure notification construction and de-duplication.

use std::collections::{HashSet, VecDeque};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::tracking::TrackedDownload;
use crate::types::{DownloadFailedEvent, Event, HistoryRecord};

use super::FailedDownloadService;

/// Build the failure notification for a set of matched history records
///
/// The first record supplies the singular fields; every record contributes
/// its episode, in order. Returns None for an empty set.
pub fn build_failure_event(
    records: &[HistoryRecord],
    message: &str,
    tracked: Option<&TrackedDownload>,
) -> Option<DownloadFailedEvent> {
    let representative = records.first()?;

    Some(DownloadFailedEvent {
        series_id: representative.series_id,
        episode_ids: records.iter().map(|r| r.episode_id).collect(),
        quality: representative.quality.clone(),
        source_title: representative.source_title.clone(),
        download_client: representative.download_client().map(String::from),
        download_id: representative.correlation_id().map(String::from),
        message: message.to_string(),
        data: representative.data.clone(),
        tracked_download: tracked.map(TrackedDownload::snapshot),
        language: representative.language.clone(),
    })
}

type LedgerKey = (String, String);

#[derive(Default)]
struct LedgerInner {
    seen: HashSet<LedgerKey>,
    order: VecDeque<LedgerKey>,
}

/// Bounded memory of notifications already sent
///
/// Keyed by correlation id and message. When full, the oldest key is
/// forgotten.
pub struct FailureLedger {
    capacity: usize,
    inner: Mutex<LedgerInner>,
}

impl FailureLedger {
    /// Create a ledger remembering at most `capacity` notifications
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(LedgerInner::default()),
        }
    }

    /// Remember a notification; false if it was already remembered
    pub async fn record(&self, correlation_id: &str, message: &str) -> bool {
        let key = (correlation_id.to_string(), message.to_string());
        let mut inner = self.inner.lock().await;

        if inner.seen.contains(&key) {
            return false;
        }

        while inner.order.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.seen.remove(&oldest);
            }
        }

        inner.seen.insert(key.clone());
        inner.order.push_back(key);
        true
    }

    /// Forget a notification so it can be sent again
    pub async fn forget(&self, correlation_id: &str, message: &str) {
        let key = (correlation_id.to_string(), message.to_string());
        let mut inner = self.inner.lock().await;

        if inner.seen.remove(&key) {
            inner.order.retain(|k| k != &key);
        }
    }

    /// Number of remembered notifications
    pub async fn len(&self) -> usize {
        self.inner.lock().await.order.len()
    }

    /// Whether nothing is remembered
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.order.is_empty()
    }
}

impl FailedDownloadService {
    /// Publish a failure notification for `records`
    ///
    /// Returns false if there was nothing to publish or the same
    /// notification was already sent.
    pub(super) async fn publish_failure(
        &self,
        records: &[HistoryRecord],
        message: &str,
        tracked: Option<&TrackedDownload>,
    ) -> Result<bool> {
        let Some(event) = build_failure_event(records, message, tracked) else {
            return Ok(false);
        };

        let dedup_key = match (&self.ledger, event.download_id.as_deref()) {
            (Some(ledger), Some(correlation_id)) => {
                if !ledger.record(correlation_id, message).await {
                    tracing::debug!(
                        correlation_id,
                        message,
                        "Failure notification already sent, skipping"
                    );
                    return Ok(false);
                }
                Some((ledger, correlation_id.to_string()))
            }
            _ => None,
        };

        tracing::info!(
            correlation_id = event.download_id.as_deref().unwrap_or(""),
            series_id = event.series_id,
            episodes = ?event.episode_ids,
            message,
            automatic = event.tracked_download.is_some(),
            "Publishing download failed event"
        );

        if let Err(e) = self.events.publish(Event::DownloadFailed(event)) {
            // not sent, so a later attempt must not be treated as a duplicate
            if let Some((ledger, correlation_id)) = dedup_key {
                ledger.forget(&correlation_id, message).await;
            }
            return Err(e);
        }

        Ok(true)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::{DownloadClientItem, TrackedDownloadState};
    use crate::types::{DOWNLOAD_CLIENT, HistoryEventType, HistoryId};
    use std::collections::HashMap;

    fn record(id: i64, episode_id: i64, source_title: &str) -> HistoryRecord {
        HistoryRecord {
            id: HistoryId(id),
            correlation_id: Some("abc".into()),
            event_type: HistoryEventType::Grabbed,
            series_id: 7,
            episode_id,
            quality: "HDTV-720p".into(),
            source_title: source_title.into(),
            language: "English".into(),
            data: HashMap::from([(DOWNLOAD_CLIENT.to_string(), "Sabnzbd".to_string())]),
            date: chrono::Utc::now(),
        }
    }

    #[test]
    fn first_record_is_representative_and_episodes_keep_order() {
        let records = vec![
            record(1, 11, "first"),
            record(2, 10, "second"),
            record(3, 12, "third"),
        ];

        let event = build_failure_event(&records, "boom", None).unwrap();
        assert_eq!(event.episode_ids, vec![11, 10, 12]);
        assert_eq!(event.source_title, "first");
        assert_eq!(event.series_id, 7);
        assert_eq!(event.download_client.as_deref(), Some("Sabnzbd"));
        assert_eq!(event.download_id.as_deref(), Some("abc"));
        assert_eq!(event.data, records[0].data);
        assert_eq!(event.message, "boom");
        assert!(event.tracked_download.is_none());
    }

    #[test]
    fn empty_record_set_builds_nothing() {
        assert!(build_failure_event(&[], "boom", None).is_none());
    }

    #[test]
    fn tracked_download_is_attached_as_snapshot() {
        let mut tracked = TrackedDownload::new(DownloadClientItem {
            download_id: "abc".into(),
            ..Default::default()
        });
        tracked
            .transition(TrackedDownloadState::FailedPending)
            .unwrap();

        let event = build_failure_event(&[record(1, 10, "t")], "boom", Some(&tracked)).unwrap();
        let snapshot = event.tracked_download.unwrap();
        assert_eq!(snapshot.correlation_id, "abc");
        assert_eq!(snapshot.state, TrackedDownloadState::FailedPending);
    }

    #[tokio::test]
    async fn ledger_rejects_repeats_and_evicts_oldest() {
        let ledger = FailureLedger::new(2);
        assert!(ledger.is_empty().await);

        assert!(ledger.record("a", "m").await);
        assert!(!ledger.record("a", "m").await);
        assert!(ledger.record("a", "other message").await);
        assert_eq!(ledger.len().await, 2);

        // third key pushes out ("a", "m")
        assert!(ledger.record("b", "m").await);
        assert_eq!(ledger.len().await, 2);
        assert!(ledger.record("a", "m").await);
    }

    #[tokio::test]
    async fn forgotten_key_can_be_recorded_again() {
        let ledger = FailureLedger::new(8);
        assert!(ledger.record("a", "m").await);
        ledger.forget("a", "m").await;
        assert!(ledger.is_empty().await);
        assert!(ledger.record("a", "m").await);
    }
}
