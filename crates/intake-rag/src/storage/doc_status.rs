//! Document status store
//!
//! The upload handler consults the store for duplicate detection; the
//! indexing worker records lifecycle transitions into it. Deployments with
//! their own document database implement [`DocStatusStore`] against it; the
//! bundled [`JsonDocStatusStore`] keeps records in memory and mirrors every
//! change to a pretty-printed JSON file.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::types::{DocStatus, DocStatusRecord};

/// Document status collaborator queried by the upload handler and updated
/// by the indexing worker
#[async_trait]
pub trait DocStatusStore: Send + Sync {
    /// Look up a record by sanitized file path
    async fn get_doc_by_file_path(&self, file_path: &str) -> Result<Option<DocStatusRecord>>;

    /// All records created under a tracking id
    async fn get_docs_by_track_id(&self, track_id: &str) -> Result<Vec<DocStatusRecord>>;

    /// Insert or replace a record
    async fn upsert(&self, record: DocStatusRecord) -> Result<()>;

    /// Advance the status of an existing record
    async fn update_status(
        &self,
        file_path: &str,
        status: DocStatus,
        error: Option<String>,
    ) -> Result<()>;

    /// All records
    async fn all(&self) -> Result<Vec<DocStatusRecord>>;
}

/// Status store persisted as a single JSON file
pub struct JsonDocStatusStore {
    records: DashMap<String, DocStatusRecord>,
    path: PathBuf,
    /// Serializes whole-file rewrites
    write_lock: Mutex<()>,
}

impl JsonDocStatusStore {
    /// Open the store at the given path, loading any existing records
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let records = DashMap::new();
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str::<Vec<DocStatusRecord>>(&content) {
                    Ok(loaded) => {
                        for record in loaded {
                            records.insert(record.file_path.clone(), record);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                }
            }
        }

        tracing::info!("Loaded {} document status records", records.len());

        Ok(Self {
            records,
            path,
            write_lock: Mutex::new(()),
        })
    }

    fn save(&self) -> Result<()> {
        let _guard = self.write_lock.lock();

        let mut docs: Vec<DocStatusRecord> =
            self.records.iter().map(|entry| entry.value().clone()).collect();
        docs.sort_by(|a, b| a.file_path.cmp(&b.file_path));

        let content = serde_json::to_string_pretty(&docs)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[async_trait]
impl DocStatusStore for JsonDocStatusStore {
    async fn get_doc_by_file_path(&self, file_path: &str) -> Result<Option<DocStatusRecord>> {
        Ok(self.records.get(file_path).map(|r| r.clone()))
    }

    async fn get_docs_by_track_id(&self, track_id: &str) -> Result<Vec<DocStatusRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|entry| entry.value().track_id == track_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn upsert(&self, record: DocStatusRecord) -> Result<()> {
        self.records.insert(record.file_path.clone(), record);
        self.save()
    }

    async fn update_status(
        &self,
        file_path: &str,
        status: DocStatus,
        error: Option<String>,
    ) -> Result<()> {
        {
            // The mutable guard must drop before save() iterates the map.
            let mut entry = self.records.get_mut(file_path).ok_or_else(|| {
                Error::Internal(format!("No status record for '{}'", file_path))
            })?;
            entry.advance(status, error);
        }
        self.save()
    }

    async fn all(&self) -> Result<Vec<DocStatusRecord>> {
        Ok(self.records.iter().map(|entry| entry.value().clone()).collect())
    }
}
