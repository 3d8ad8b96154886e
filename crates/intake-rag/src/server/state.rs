//! Application state for the intake server

use dashmap::DashMap;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::config::IntakeConfig;
use crate::error::Result;
use crate::ingest::DocManager;
use crate::pipeline::{IndexPipeline, NullPipeline};
use crate::processing::{IndexJob, IndexQueue, IndexWorker};
use crate::storage::{DocStatusStore, JsonDocStatusStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: IntakeConfig,
    /// Input directory manager
    doc_manager: DocManager,
    /// Document status collaborator
    doc_status: Arc<dyn DocStatusStore>,
    /// Indexing pipeline collaborator
    pipeline: Arc<dyn IndexPipeline>,
    /// Queue feeding the indexing worker
    index_queue: Arc<IndexQueue>,
    /// Per-filename locks serializing concurrent uploads
    path_locks: PathLocks,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Create state with the bundled status store and a no-op pipeline
    pub async fn new(config: IntakeConfig) -> Result<Self> {
        let doc_status = Arc::new(JsonDocStatusStore::new(config.storage.doc_status_path())?);
        Self::with_collaborators(config, doc_status, Arc::new(NullPipeline)).await
    }

    /// Create state with injected collaborators and start the worker
    pub async fn with_collaborators(
        config: IntakeConfig,
        doc_status: Arc<dyn DocStatusStore>,
        pipeline: Arc<dyn IndexPipeline>,
    ) -> Result<Self> {
        let doc_manager = DocManager::new(&config.storage)?;
        tracing::info!("Input directory: {}", doc_manager.input_dir().display());

        let worker_count = config
            .processing
            .index_workers
            .unwrap_or_else(|| num_cpus::get().min(4));
        let (index_queue, receiver) = IndexQueue::new(worker_count);
        let index_queue = Arc::new(index_queue);
        tracing::info!("Index queue initialized with {} workers", worker_count);

        let state = Self {
            inner: Arc::new(AppStateInner {
                config,
                doc_manager,
                doc_status,
                pipeline,
                index_queue: index_queue.clone(),
                path_locks: PathLocks::new(),
                ready: RwLock::new(true),
            }),
        };

        // Start the background worker with a clone of the state
        let worker = IndexWorker::new(state.clone(), index_queue);
        tokio::spawn(async move {
            worker.run(receiver).await;
        });

        Ok(state)
    }

    /// Get configuration
    pub fn config(&self) -> &IntakeConfig {
        &self.inner.config
    }

    /// Get the input directory manager
    pub fn doc_manager(&self) -> &DocManager {
        &self.inner.doc_manager
    }

    /// Get the document status store
    pub fn doc_status(&self) -> &Arc<dyn DocStatusStore> {
        &self.inner.doc_status
    }

    /// Get the indexing pipeline
    pub fn pipeline(&self) -> &Arc<dyn IndexPipeline> {
        &self.inner.pipeline
    }

    /// Get the index queue
    pub fn index_queue(&self) -> &Arc<IndexQueue> {
        &self.inner.index_queue
    }

    /// Get the per-filename lock registry
    pub fn path_locks(&self) -> &PathLocks {
        &self.inner.path_locks
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }

    /// Hand a persisted file to the indexing worker. Fire-and-forget: the
    /// caller never observes completion through this call.
    pub async fn enqueue_index(&self, file_path: PathBuf, track_id: String) {
        self.inner
            .index_queue
            .submit(IndexJob {
                file_path,
                track_id,
            })
            .await;
    }
}

/// In-memory lock registry keyed by sanitized filename.
///
/// Holding the guard for a name serializes the duplicate checks and the
/// write against concurrent uploads of the same file.
pub struct PathLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl PathLocks {
    fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Acquire the lock for a sanitized filename
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
