use crate::db::NewHistoryRecord;
use crate::types::{DOWNLOAD_CLIENT, HistoryEventType};
use std::collections::HashMap;


/// Grab record for one episode of a download
pub(super) fn grab(correlation_id: Option<&str>, episode_id: i64) -> NewHistoryRecord {
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
