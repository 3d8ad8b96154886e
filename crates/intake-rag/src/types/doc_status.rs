//! Document status records mirrored from the indexing collaborator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a document inside the indexing pipeline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocStatus {
    /// Accepted, waiting for the worker
    Pending,
    /// Currently being indexed
    Processing,
    /// Indexing finished
    Processed,
    /// Indexing failed
    Failed,
}

impl DocStatus {
    /// Lowercase name used in user-facing messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Processed => "processed",
            Self::Failed => "failed",
        }
    }
}

/// Record of a document known to the status store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocStatusRecord {
    /// Sanitized file name, unique within the input directory
    pub file_path: String,
    /// Current lifecycle status
    pub status: DocStatus,
    /// Tracking id of the upload that created this record
    pub track_id: String,
    /// Error message if indexing failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

impl DocStatusRecord {
    /// Create a pending record for a freshly accepted upload
    pub fn pending(file_path: String, track_id: String) -> Self {
        let now = Utc::now();
        Self {
            file_path,
            status: DocStatus::Pending,
            track_id,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Advance the record to a new status. The error message is kept only
    /// for failed records.
    pub fn advance(&mut self, status: DocStatus, error: Option<String>) {
        self.status = status;
        self.error = if status == DocStatus::Failed { error } else { None };
        self.updated_at = Utc::now();
    }
}
