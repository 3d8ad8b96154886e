//! Background indexing: job queue and worker

mod job_queue;
mod worker;

pub use job_queue::{IndexJob, IndexJobStatus, IndexProgress, IndexQueue, QueueStats};
pub use worker::IndexWorker;
