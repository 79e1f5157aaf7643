//! Error types for failed-downloads
//!
//! Expected absences (no grabbed history for a correlation id, an unknown
//! correlation id on the manual path) are modeled as empty results, never as
//! errors. Everything in this module is a genuine failure that the caller
//! (usually the polling loop) has to see:
//! - a history id that does not exist
//! - an unreachable history log or event bus
//! - an attempt to move a tracked download backwards in its lifecycle

use crate::tracking::TrackedDownloadState;
use thiserror::Error;

/// Result type alias for failed-downloads operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for failed-downloads
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "dedup_capacity")
        key: Option<String>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// History lookup failed
    #[error("history error: {0}")]
    History(#[from] HistoryError),

    /// The event bus refused or could not accept an event
    #[error("event bus error: {0}")]
    EventBus(String),

    /// Tracked download lifecycle edge that is not allowed
    #[error("cannot move tracked download {correlation_id} from {from} to {to}")]
    InvalidTransition {
        /// Correlation id of the tracked download
        correlation_id: String,
        /// Current state
        from: TrackedDownloadState,
        /// Requested state
        to: TrackedDownloadState,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// History log errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// No history record with this id exists
    #[error("history record {id} not found")]
    NotFound {
        /// The history id that was requested
        id: i64,
    },

    /// A stored record could not be decoded
    #[error("history record {id} is malformed: {reason}")]
    Malformed {
        /// The history id of the bad row
        id: i64,
        /// What was wrong with it
        reason: String,
    },
}

impl Error {
    /// Machine-readable error code for hosts that surface errors to users
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Database(_) | Error::Sqlx(_) => "database_error",
            Error::History(HistoryError::NotFound { .. }) => "not_found",
            Error::History(HistoryError::Malformed { .. }) => "malformed_history",
            Error::EventBus(_) => "event_bus_error",
            Error::InvalidTransition { .. } => "invalid_transition",
            Error::Serialization(_) => "serialization_error",
        }
    }

    /// Whether this error means the requested history record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::History(HistoryError::NotFound { .. }))
    }
}
