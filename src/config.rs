//! Configuration types for failed-downloads

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// History database path (default: "./failed-downloads.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Event bus configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventConfig {
    /// Events buffered per subscriber before it starts lagging (default: 1000)
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Failure notification behavior
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FailureConfig {
    /// Drop a notification identical to one already sent (default: true)
    ///
    /// Two notifications are identical when they carry the same correlation
    /// id and the same message. Notifications without a correlation id are
    /// always sent.
    ///
    /// Manual failures count too: marking the same download as failed a
    /// second time publishes nothing and returns `Ok(false)`. A manual mark
    /// after an automatic failure is still sent, since the messages differ.
    #[serde(default = "default_true")]
    pub deduplicate: bool,

    /// How many sent notifications are remembered for de-duplication (default: 1024)
    ///
    /// The oldest entries are forgotten first.
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,
}

impl Default for FailureConfig {
    fn default() -> Self {
        Self {
            deduplicate: true,
            dedup_capacity: default_dedup_capacity(),
        }
    }
}

/// Main configuration for [`crate::FailureMonitor`]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// History database settings
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Event bus settings
    #[serde(default)]
    pub events: EventConfig,

    /// Failure notification settings
    #[serde(default)]
    pub failures: FailureConfig,
}

impl Config {
    /// Reject settings that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.events.channel_capacity == 0 {
            return Err(Error::Config {
                message: "event channel capacity must be at least 1".to_string(),
                key: Some("channel_capacity".to_string()),
            });
        }
        if self.failures.deduplicate && self.failures.dedup_capacity == 0 {
            return Err(Error::Config {
                message: "dedup capacity must be at least 1 when deduplication is enabled"
                    .to_string(),
                key: Some("dedup_capacity".to_string()),
            });
        }
        Ok(())
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./failed-downloads.db")
}

fn default_channel_capacity() -> usize {
    1000
}

fn default_dedup_capacity() -> usize {
    1024
}

fn default_true() -> bool {
    true
}
