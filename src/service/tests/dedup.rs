use super::*;
use crate::config::FailureConfig;

#[tokio::test]
async fn test_repeated_manual_mark_is_sent_once() {
    let mut t = create_test_service().await;
    t.grab(Some("xyz"), 5).await;

    assert!(t.service.mark_as_failed_by_correlation("xyz").await.unwrap());
    assert!(!t.service.mark_as_failed_by_correlation("xyz").await.unwrap());

    assert_eq!(t.published().len(), 1);
}

#[tokio::test]
async fn test_manual_mark_by_history_and_by_correlation_share_the_key() {
    let mut t = create_test_service().await;
    let id = t.grab(Some("xyz"), 5).await;

    assert!(t.service.mark_as_failed(id).await.unwrap());
    assert!(!t.service.mark_as_failed_by_correlation("xyz").await.unwrap());

    assert_eq!(t.published().len(), 1);
}

#[tokio::test]
async fn test_manual_after_automatic_is_still_sent() {
    let mut t = create_test_service().await;
    t.grab(Some("abc"), 10).await;
    let mut download = tracked("abc", true, DownloadItemStatus::Failed, None);

    t.service.check(&mut download).await.unwrap();
    assert!(t.service.process_failed(&mut download).await.unwrap());
    assert!(t.service.mark_as_failed_by_correlation("abc").await.unwrap());

    let messages: Vec<String> = t.published().into_iter().map(|e| e.message).collect();
    assert_eq!(
        messages,
        vec![
            ENCRYPTED_DOWNLOAD_DETECTED.to_string(),
            MANUALLY_MARKED_AS_FAILED.to_string()
        ]
    );
}

#[tokio::test]
async fn test_automatic_duplicate_still_finishes_lifecycle() {
    let mut t = create_test_service().await;
    t.grab(Some("abc"), 10).await;

    // two tracked views of the same download, e.g. after a client reconnect
    let mut first = tracked("abc", false, DownloadItemStatus::Failed, None);
    let mut second = tracked("abc", false, DownloadItemStatus::Failed, None);
    for download in [&mut first, &mut second] {
        t.service.check(download).await.unwrap();
    }

    assert!(t.service.process_failed(&mut first).await.unwrap());
    assert!(!t.service.process_failed(&mut second).await.unwrap());

    assert_eq!(first.state(), TrackedDownloadState::Failed);
    assert_eq!(
        second.state(),
        TrackedDownloadState::Failed,
        "a suppressed duplicate must not leave the download pending forever"
    );
    assert_eq!(t.published().len(), 1);
}

#[tokio::test]
async fn test_records_without_correlation_are_never_deduplicated() {
    let mut t = create_test_service().await;
    let id = t.grab(None, 10).await;

    assert!(t.service.mark_as_failed(id).await.unwrap());
    assert!(t.service.mark_as_failed(id).await.unwrap());

    assert_eq!(t.published().len(), 2);
}

#[tokio::test]
async fn test_dedup_disabled_sends_every_time() {
    let mut t = create_test_service_with(FailureConfig {
        deduplicate: false,
        ..Default::default()
    })
    .await;
    t.grab(Some("xyz"), 5).await;

    assert!(t.service.mark_as_failed_by_correlation("xyz").await.unwrap());
    assert!(t.service.mark_as_failed_by_correlation("xyz").await.unwrap());

    assert_eq!(t.published().len(), 2);
}

#[tokio::test]
async fn test_failed_publish_does_not_poison_the_ledger() {
    let t = create_test_service().await;
    t.grab(Some("xyz"), 5).await;

    let ledger = std::sync::Arc::new(FailureLedger::new(16));
    let closed = FailedDownloadService {
        history: t.db.clone(),
        events: std::sync::Arc::new(ClosedBus),
        ledger: Some(ledger.clone()),
    };
    assert!(closed.mark_as_failed_by_correlation("xyz").await.is_err());
    assert!(ledger.is_empty().await);

    let open = FailedDownloadService {
        history: t.db.clone(),
        events: t.bus.clone(),
        ledger: Some(ledger.clone()),
    };
    assert!(open.mark_as_failed_by_correlation("xyz").await.unwrap());
    assert_eq!(ledger.len().await, 1);
}
