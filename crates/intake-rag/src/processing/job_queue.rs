//! Queue handing accepted uploads to the indexing worker

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Status of a queued indexing job
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IndexJobStatus {
    Queued,
    Indexing,
    Complete,
    Failed,
}

/// A file handed off for background indexing
#[derive(Debug, Clone)]
pub struct IndexJob {
    pub file_path: PathBuf,
    pub track_id: String,
}

/// Progress of an indexing job, kept in memory for status polling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexProgress {
    pub track_id: String,
    pub file_path: String,
    pub status: IndexJobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl IndexProgress {
    fn new(job: &IndexJob) -> Self {
        let now = chrono::Utc::now();
        Self {
            track_id: job.track_id.clone(),
            file_path: job.file_path.display().to_string(),
            status: IndexJobStatus::Queued,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Queue connecting the upload handler to the indexing worker
pub struct IndexQueue {
    /// Progress per track id
    jobs: Arc<DashMap<String, IndexProgress>>,
    /// Channel to the worker
    sender: mpsc::Sender<IndexJob>,
    /// Number of parallel indexing jobs
    worker_count: usize,
}

impl IndexQueue {
    /// Create the queue and the receiver end for the worker
    pub fn new(worker_count: usize) -> (Self, mpsc::Receiver<IndexJob>) {
        let (sender, receiver) = mpsc::channel(1000);

        let queue = Self {
            jobs: Arc::new(DashMap::new()),
            sender,
            worker_count,
        };

        (queue, receiver)
    }

    /// Submit a job. Fire-and-forget: the caller gets no completion signal
    /// beyond the progress map.
    pub async fn submit(&self, job: IndexJob) {
        let track_id = job.track_id.clone();
        self.jobs.insert(track_id.clone(), IndexProgress::new(&job));

        if let Err(e) = self.sender.send(job).await {
            tracing::error!("Failed to submit indexing job: {}", e);
            self.update_status(&track_id, IndexJobStatus::Failed, Some(e.to_string()));
        }
    }

    /// Progress for a tracking id
    pub fn get_progress(&self, track_id: &str) -> Option<IndexProgress> {
        self.jobs.get(track_id).map(|p| p.clone())
    }

    /// Update job status
    pub fn update_status(&self, track_id: &str, status: IndexJobStatus, error: Option<String>) {
        if let Some(mut progress) = self.jobs.get_mut(track_id) {
            progress.status = status;
            progress.error = error;
            progress.updated_at = chrono::Utc::now();
        }
    }

    /// Queue statistics
    pub fn stats(&self) -> QueueStats {
        let mut stats = QueueStats {
            worker_count: self.worker_count,
            ..QueueStats::default()
        };
        for job in self.jobs.iter() {
            match job.status {
                IndexJobStatus::Queued => stats.queued += 1,
                IndexJobStatus::Indexing => stats.indexing += 1,
                IndexJobStatus::Complete => stats.complete += 1,
                IndexJobStatus::Failed => stats.failed += 1,
            }
        }
        stats
    }
}

/// Queue statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueStats {
    pub queued: usize,
    pub indexing: usize,
    pub complete: usize,
    pub failed: usize,
    pub worker_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn submitted_jobs_are_tracked_and_delivered() {
        let (queue, mut receiver) = IndexQueue::new(2);

        queue
            .submit(IndexJob {
                file_path: PathBuf::from("/inputs/a.txt"),
                track_id: "upload_1".into(),
            })
            .await;

        let job = receiver.recv().await.unwrap();
        assert_eq!(job.track_id, "upload_1");

        let progress = queue.get_progress("upload_1").unwrap();
        assert_eq!(progress.status, IndexJobStatus::Queued);

        queue.update_status("upload_1", IndexJobStatus::Complete, None);
        assert_eq!(
            queue.get_progress("upload_1").unwrap().status,
            IndexJobStatus::Complete
        );

        let stats = queue.stats();
        assert_eq!(stats.complete, 1);
        assert_eq!(stats.worker_count, 2);
    }

    #[tokio::test]
    async fn submitting_after_the_worker_is_gone_marks_the_job_failed() {
        let (queue, receiver) = IndexQueue::new(1);
        drop(receiver);

        queue
            .submit(IndexJob {
                file_path: PathBuf::from("/inputs/a.txt"),
                track_id: "upload_1".into(),
            })
            .await;

        assert_eq!(
            queue.get_progress("upload_1").unwrap().status,
            IndexJobStatus::Failed
        );
    }
}
