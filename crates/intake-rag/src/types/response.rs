//! Wire-level response types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::processing::{IndexProgress, QueueStats};

use super::doc_status::{DocStatus, DocStatusRecord};

/// Outcome of an upload request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsertStatus {
    /// File accepted and queued for indexing
    Success,
    /// File already known; nothing was written
    Duplicated,
}

/// Response from `POST /documents/upload`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertResponse {
    /// Outcome of the request
    pub status: InsertStatus,
    /// Human-readable description of what happened
    pub message: String,
    /// Tracking id for status polling; empty for duplicated uploads
    pub track_id: String,
}

impl InsertResponse {
    /// Build a success response carrying a fresh tracking id
    pub fn success(message: String, track_id: String) -> Self {
        Self {
            status: InsertStatus::Success,
            message,
            track_id,
        }
    }

    /// Build a duplicated response. Duplicates are successful no-ops, not
    /// errors, and carry no tracking id.
    pub fn duplicated(message: String) -> Self {
        Self {
            status: InsertStatus::Duplicated,
            message,
            track_id: String::new(),
        }
    }
}

/// Response from `GET /documents/track_status/:track_id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackStatusResponse {
    /// The polled tracking id
    pub track_id: String,
    /// Queue-side progress, present while the job is still held in memory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<IndexProgress>,
    /// Status-store records created under this tracking id
    pub documents: Vec<DocStatusRecord>,
}

/// Response from `GET /documents/statuses`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusesResponse {
    /// All known documents grouped by status
    pub statuses: HashMap<DocStatus, Vec<DocStatusRecord>>,
    /// Indexing queue statistics
    pub queue: QueueStats,
}
