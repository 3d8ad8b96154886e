//! Indexing pipeline seam
//!
//! Indexing itself lives outside this service. The worker hands accepted
//! files to an [`IndexPipeline`], which owns parsing, chunking, embedding,
//! and storage.

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;

/// Entry point to the external indexing pipeline
#[async_trait]
pub trait IndexPipeline: Send + Sync {
    /// Index a file that was persisted to the input directory
    async fn index_file(&self, file_path: &Path, track_id: &str) -> Result<()>;
}

/// Pipeline that only acknowledges files, for running the intake service
/// without an indexing backend attached
#[derive(Debug, Default)]
pub struct NullPipeline;

#[async_trait]
impl IndexPipeline for NullPipeline {
    async fn index_file(&self, file_path: &Path, track_id: &str) -> Result<()> {
        tracing::info!(
            "No indexing backend attached; acknowledged {} (track_id: {})",
            file_path.display(),
            track_id
        );
        Ok(())
    }
}
