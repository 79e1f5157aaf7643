//! History log port

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{HistoryEventType, HistoryId, HistoryRecord};

/// Read access to the append-only history log
///
/// The default implementation is [`crate::db::Database`]. Hosts that keep
/// history elsewhere implement this trait over their own store.
#[async_trait]
pub trait HistoryLog: Send + Sync {
    /// Fetch one record
    ///
    /// # Errors
    ///
    /// Returns [`crate::HistoryError::NotFound`] if no record has this id, or
    /// a storage error if the log is unreachable.
    async fn get_by_id(&self, id: HistoryId) -> Result<HistoryRecord>;

    /// All records with this correlation id and event type, oldest first
    ///
    /// An unknown correlation id yields an empty vector, not an error.
    async fn find_by_correlation(
        &self,
        correlation_id: &str,
        event_type: HistoryEventType,
    ) -> Result<Vec<HistoryRecord>>;
}
