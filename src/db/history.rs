//! History log operations.

use async_trait::async_trait;

use crate::error::HistoryError;
use crate::history::HistoryLog;
use crate::types::{HistoryEventType, HistoryId, HistoryRecord};
use crate::{Error, Result};

use super::{Database, HistoryRow, NewHistoryRecord};

const SELECT_HISTORY: &str = r#"
    SELECT id, download_id, event_type, series_id, episode_id, quality,
           source_title, language, data, date
    FROM history
"#;

impl Database {
    /// Append a record to the history log
    ///
    /// Records are immutable once written; grabs of a season pack are
    /// inserted as one record per episode sharing a correlation id.
    pub async fn insert_history(&self, record: &NewHistoryRecord) -> Result<HistoryId> {
        let data = serde_json::to_string(&record.data)?;

        let result = sqlx::query(
            r#"
            INSERT INTO history (
                download_id, event_type, series_id, episode_id, quality,
                source_title, language, data, date
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.correlation_id)
        .bind(record.event_type.to_i32())
        .bind(record.series_id)
        .bind(record.episode_id)
        .bind(&record.quality)
        .bind(&record.source_title)
        .bind(&record.language)
        .bind(data)
        .bind(record.date)
        .execute(&self.pool)
        .await
        .map_err(Error::Sqlx)?;

        Ok(HistoryId(result.last_insert_rowid()))
    }

    /// Get a single history record by ID
    pub async fn get_history_record(&self, id: HistoryId) -> Result<Option<HistoryRecord>> {
        let row = sqlx::query_as::<_, HistoryRow>(&format!("{SELECT_HISTORY} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Sqlx)?;

        row.map(HistoryRecord::try_from)
            .transpose()
            .map_err(Error::from)
    }

    /// Records with this correlation id and event type, in insertion order
    pub async fn find_history_by_correlation(
        &self,
        correlation_id: &str,
        event_type: HistoryEventType,
    ) -> Result<Vec<HistoryRecord>> {
        let rows = sqlx::query_as::<_, HistoryRow>(&format!(
            "{SELECT_HISTORY} WHERE download_id = ? AND event_type = ? ORDER BY id ASC"
        ))
        .bind(correlation_id)
        .bind(event_type.to_i32())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)?;

        rows.into_iter()
            .map(|row| HistoryRecord::try_from(row).map_err(Error::from))
            .collect()
    }

    /// Count history records (optionally filtered by event type)
    pub async fn count_history(&self, event_type: Option<HistoryEventType>) -> Result<i64> {
        let count = if let Some(event_type) = event_type {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM history WHERE event_type = ?")
                .bind(event_type.to_i32())
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Sqlx)?
        } else {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM history")
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Sqlx)?
        };

        Ok(count)
    }

    /// Delete a single history record
    ///
    /// Returns true if a record was deleted.
    pub async fn delete_history(&self, id: HistoryId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM history WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every record of one download
    ///
    /// Returns the number of records deleted.
    pub async fn delete_history_by_correlation(&self, correlation_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM history WHERE download_id = ?")
            .bind(correlation_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Sqlx)?;

        Ok(result.rows_affected())
    }

    /// Delete history records older than the specified timestamp
    ///
    /// Returns the number of records deleted.
    pub async fn delete_history_before(&self, before_timestamp: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM history WHERE date < ?")
            .bind(before_timestamp)
            .execute(&self.pool)
            .await
            .map_err(Error::Sqlx)?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl HistoryLog for Database {
    async fn get_by_id(&self, id: HistoryId) -> Result<HistoryRecord> {
        self.get_history_record(id)
            .await?
            .ok_or(Error::History(HistoryError::NotFound { id: id.get() }))
    }

    async fn find_by_correlation(
        &self,
        correlation_id: &str,
        event_type: HistoryEventType,
    ) -> Result<Vec<HistoryRecord>> {
        self.find_history_by_correlation(correlation_id, event_type)
            .await
    }
}
