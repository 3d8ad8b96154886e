//! Background worker driving the indexing pipeline

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::time::timeout;

use crate::server::state::AppState;
use crate::types::{DocStatus, DocStatusRecord};

use super::job_queue::{IndexJob, IndexJobStatus, IndexQueue};

/// Worker that consumes indexing jobs and records their outcome in the
/// status store and the progress map
pub struct IndexWorker {
    state: AppState,
    queue: Arc<IndexQueue>,
    parallel_jobs: usize,
    index_timeout: Duration,
}

impl IndexWorker {
    /// Create a new worker
    pub fn new(state: AppState, queue: Arc<IndexQueue>) -> Self {
        let config = state.config();

        let parallel_jobs = config
            .processing
            .index_workers
            .unwrap_or_else(|| num_cpus::get().min(4));
        let index_timeout = Duration::from_secs(config.processing.index_timeout_secs);

        tracing::info!(
            "Index worker configured: {} parallel jobs, {}s timeout",
            parallel_jobs,
            index_timeout.as_secs()
        );

        Self {
            state,
            queue,
            parallel_jobs,
            index_timeout,
        }
    }

    /// Consume jobs until the queue side is dropped
    pub async fn run(self, mut receiver: mpsc::Receiver<IndexJob>) {
        let semaphore = Arc::new(Semaphore::new(self.parallel_jobs));

        while let Some(job) = receiver.recv().await {
            let permit = semaphore.clone().acquire_owned().await.unwrap();
            let state = self.state.clone();
            let queue = self.queue.clone();
            let index_timeout = self.index_timeout;

            tokio::spawn(async move {
                Self::process_job(state, queue, job, index_timeout).await;
                drop(permit);
            });
        }
    }

    async fn process_job(
        state: AppState,
        queue: Arc<IndexQueue>,
        job: IndexJob,
        index_timeout: Duration,
    ) {
        let track_id = job.track_id.clone();
        let file_name = job
            .file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        tracing::info!("Indexing {} (track_id: {})", file_name, track_id);
        queue.update_status(&track_id, IndexJobStatus::Indexing, None);

        let store = state.doc_status();
        if let Err(e) = store
            .upsert(DocStatusRecord::pending(file_name.clone(), track_id.clone()))
            .await
        {
            tracing::error!("Failed to record pending status for {}: {}", file_name, e);
        }
        if let Err(e) = store
            .update_status(&file_name, DocStatus::Processing, None)
            .await
        {
            tracing::error!("Failed to mark {} as processing: {}", file_name, e);
        }

        let result = timeout(
            index_timeout,
            state.pipeline().index_file(&job.file_path, &track_id),
        )
        .await;

        match result {
            Ok(Ok(())) => {
                if let Err(e) = store
                    .update_status(&file_name, DocStatus::Processed, None)
                    .await
                {
                    tracing::error!("Failed to mark {} as processed: {}", file_name, e);
                }
                queue.update_status(&track_id, IndexJobStatus::Complete, None);
                tracing::info!("Indexed {} (track_id: {})", file_name, track_id);
            }
            Ok(Err(e)) => {
                let message = e.to_string();
                tracing::error!("Indexing failed for {}: {}", file_name, message);
                if let Err(e) = store
                    .update_status(&file_name, DocStatus::Failed, Some(message.clone()))
                    .await
                {
                    tracing::error!("Failed to mark {} as failed: {}", file_name, e);
                }
                queue.update_status(&track_id, IndexJobStatus::Failed, Some(message));
            }
            Err(_) => {
                let message = format!("Indexing timeout after {}s", index_timeout.as_secs());
                tracing::error!("{} for {}", message, file_name);
                if let Err(e) = store
                    .update_status(&file_name, DocStatus::Failed, Some(message.clone()))
                    .await
                {
                    tracing::error!("Failed to mark {} as failed: {}", file_name, e);
                }
                queue.update_status(&track_id, IndexJobStatus::Failed, Some(message));
            }
        }
    }
}
