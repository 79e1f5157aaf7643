//! Database layer for failed-downloads
//!
//! SQLite persistence for the history log.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] - Database lifecycle, schema migrations
//! - [`history`] - History log inserts, lookups and cleanup

use crate::error::HistoryError;
use crate::types::{HistoryEventType, HistoryId, HistoryRecord};
use sqlx::{FromRow, sqlite::SqlitePool};
use std::collections::HashMap;

mod history;
mod migrations;

/// New history record to be inserted into the database
#[derive(Debug, Clone)]
pub struct NewHistoryRecord {
    /// Download-client id (None for events without a download)
    pub correlation_id: Option<String>,
    /// What happened
    pub event_type: HistoryEventType,
    /// Series the episode belongs to
    pub series_id: i64,
    /// Episode this record is about
    pub episode_id: i64,
    /// Release quality
    pub quality: String,
    /// Release title
    pub source_title: String,
    /// Audio language
    pub language: String,
    /// Free-form event data
    pub data: HashMap<String, String>,
    /// Unix timestamp of the event
    pub date: i64,
}

/// History record from database (raw from SQLite)
#[derive(Debug, Clone, FromRow)]
pub struct HistoryRow {
    /// Unique database ID
    pub id: i64,
    /// Download-client id
    pub download_id: Option<String>,
    /// Event type code
    pub event_type: i32,
    /// Series the episode belongs to
    pub series_id: i64,
    /// Episode this record is about
    pub episode_id: i64,
    /// Release quality
    pub quality: String,
    /// Release title
    pub source_title: String,
    /// Audio language
    pub language: String,
    /// Event data as a JSON object
    pub data: String,
    /// Unix timestamp of the event
    pub date: i64,
}

impl TryFrom<HistoryRow> for HistoryRecord {
    type Error = HistoryError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        use chrono::{TimeZone, Utc};

        let data: HashMap<String, String> =
            serde_json::from_str(&row.data).map_err(|e| HistoryError::Malformed {
                id: row.id,
                reason: format!("invalid data column: {}", e),
            })?;

        let date = Utc
            .timestamp_opt(row.date, 0)
            .single()
            .ok_or_else(|| HistoryError::Malformed {
                id: row.id,
                reason: format!("date out of range: {}", row.date),
            })?;

        Ok(HistoryRecord {
            id: HistoryId(row.id),
            correlation_id: row.download_id,
            event_type: HistoryEventType::from_i32(row.event_type),
            series_id: row.series_id,
            episode_id: row.episode_id,
            quality: row.quality,
            source_title: row.source_title,
            language: row.language,
            data,
            date,
        })
    }
}

/// Database handle for failed-downloads
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
