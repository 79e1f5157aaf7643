//! Core types for failed-downloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::tracking::TrackedDownloadSnapshot;

/// Key in [`HistoryRecord::data`] holding the name of the download client
pub const DOWNLOAD_CLIENT: &str = "downloadClient";

/// Unique identifier for a history record
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryId(pub i64);

impl HistoryId {
    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for HistoryId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<HistoryId> for i64 {
    fn from(id: HistoryId) -> Self {
        id.0
    }
}

impl std::fmt::Display for HistoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for HistoryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl sqlx::Type<sqlx::Sqlite> for HistoryId {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for HistoryId {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::Encode::<sqlx::Sqlite>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for HistoryId {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let id = <i64 as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self(id))
    }
}

/// Kind of event recorded in the history log
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryEventType {
    /// Unrecognized stored value
    Unknown,
    /// The application initiated the download
    Grabbed,
    /// Files were imported from a series folder
    SeriesFolderImported,
    /// Files were imported from the download folder
    DownloadFolderImported,
    /// The download was reported as failed
    DownloadFailed,
    /// An episode file was deleted
    EpisodeFileDeleted,
    /// An episode file was renamed
    EpisodeFileRenamed,
    /// The download was ignored by the user
    DownloadIgnored,
}

impl HistoryEventType {
    /// Convert integer event code to HistoryEventType
    pub fn from_i32(code: i32) -> Self {
        match code {
            1 => HistoryEventType::Grabbed,
            2 => HistoryEventType::SeriesFolderImported,
            3 => HistoryEventType::DownloadFolderImported,
            4 => HistoryEventType::DownloadFailed,
            5 => HistoryEventType::EpisodeFileDeleted,
            6 => HistoryEventType::EpisodeFileRenamed,
            7 => HistoryEventType::DownloadIgnored,
            // never map an unknown code to Grabbed, it would make the row count as a grab
            _ => HistoryEventType::Unknown,
        }
    }

    /// Convert HistoryEventType to integer event code
    pub fn to_i32(&self) -> i32 {
        match self {
            HistoryEventType::Unknown => 0,
            HistoryEventType::Grabbed => 1,
            HistoryEventType::SeriesFolderImported => 2,
            HistoryEventType::DownloadFolderImported => 3,
            HistoryEventType::DownloadFailed => 4,
            HistoryEventType::EpisodeFileDeleted => 5,
            HistoryEventType::EpisodeFileRenamed => 6,
            HistoryEventType::DownloadIgnored => 7,
        }
    }
}

/// One row of the history log
///
/// Created when the event happens and immutable afterwards. A season pack
/// grab produces one record per episode, all sharing the same correlation id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Unique history identifier
    pub id: HistoryId,

    /// Download-client id of the download this record belongs to (None if there was none)
    pub correlation_id: Option<String>,

    /// What happened
    pub event_type: HistoryEventType,

    /// Series the episode belongs to
    pub series_id: i64,

    /// Episode this record is about
    pub episode_id: i64,

    /// Quality of the release
    pub quality: String,

    /// Release title as reported by the indexer
    pub source_title: String,

    /// Audio language of the release
    pub language: String,

    /// Free-form event data (download client name, indexer, ...)
    pub data: HashMap<String, String>,

    /// When the event was recorded
    pub date: DateTime<Utc>,
}

impl HistoryRecord {
    /// Correlation id, or None when it is absent or blank
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }

    /// Name of the download client that handled this grab, if recorded
    pub fn download_client(&self) -> Option<&str> {
        self.data.get(DOWNLOAD_CLIENT).map(String::as_str)
    }
}

/// Event published on the event bus
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A grabbed download failed (automatically detected or marked by hand)
    DownloadFailed(DownloadFailedEvent),
}

/// Failure notification for one download
///
/// Singular fields come from the first matched history record. `episode_ids`
/// has one entry per matched record, in match order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DownloadFailedEvent {
    /// Series of the failed download
    pub series_id: i64,

    /// Episodes covered by the failed download
    pub episode_ids: Vec<i64>,

    /// Quality of the failed release
    pub quality: String,

    /// Release title of the failed download
    pub source_title: String,

    /// Download client that handled the download
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_client: Option<String>,

    /// Correlation id of the failed download
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_id: Option<String>,

    /// Why the download failed
    pub message: String,

    /// Event data copied from the representative history record
    pub data: HashMap<String, String>,

    /// Tracked download that triggered the failure (automatic detection only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracked_download: Option<TrackedDownloadSnapshot>,

    /// Audio language of the failed release
    pub language: String,
}
