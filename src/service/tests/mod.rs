use super::test_helpers::*;
use super::*;
use crate::tracking::{DownloadItemStatus, TrackedDownloadState, TrackedDownloadStatus};
use crate::types::HistoryId;

mod dedup;
