//! Document intake: input directory management and upload persistence

pub mod metadata;
pub mod sanitize;

pub use sanitize::sanitize_filename;

use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::config::StorageConfig;
use crate::error::Result;

/// Manages the input directory uploads land in
#[derive(Debug, Clone)]
pub struct DocManager {
    input_dir: PathBuf,
    supported_extensions: Vec<String>,
}

impl DocManager {
    /// Create a manager, creating the input directory if needed
    pub fn new(config: &StorageConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.input_dir)?;
        Ok(Self {
            input_dir: config.input_dir.clone(),
            supported_extensions: config.supported_extensions.clone(),
        })
    }

    /// The directory uploads are stored in
    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// Extensions accepted for upload
    pub fn supported_extensions(&self) -> &[String] {
        &self.supported_extensions
    }

    /// Check a sanitized filename's extension against the supported set
    pub fn is_supported_file(&self, filename: &str) -> bool {
        let ext = match Path::new(filename).extension().and_then(|e| e.to_str()) {
            Some(ext) => format!(".{}", ext.to_lowercase()),
            None => return false,
        };
        self.supported_extensions
            .iter()
            .any(|s| s.eq_ignore_ascii_case(&ext))
    }

    /// Resolve the storage path for a sanitized filename
    pub fn target_path(&self, safe_filename: &str) -> PathBuf {
        self.input_dir.join(safe_filename)
    }

    /// Persist uploaded bytes at the target path.
    ///
    /// The file is created with `create_new`, so a concurrent writer that
    /// slipped past the duplicate checks surfaces as an error instead of a
    /// silent overwrite.
    pub async fn persist_upload(&self, path: &Path, data: &[u8]) -> Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await?;
        file.write_all(data).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use tempfile::tempdir;

    fn manager(dir: &Path) -> DocManager {
        let config = StorageConfig {
            input_dir: dir.to_path_buf(),
            ..StorageConfig::default()
        };
        DocManager::new(&config).unwrap()
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let manager = manager(dir.path());

        assert!(manager.is_supported_file("report.pdf"));
        assert!(manager.is_supported_file("REPORT.PDF"));
        assert!(manager.is_supported_file("notes.Txt"));
        assert!(!manager.is_supported_file("tool.exe"));
        assert!(!manager.is_supported_file("no_extension"));
    }

    #[tokio::test]
    async fn persist_upload_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let manager = manager(dir.path());
        let path = manager.target_path("doc.txt");

        manager.persist_upload(&path, b"first").await.unwrap();
        assert!(manager.persist_upload(&path, b"second").await.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");
    }
}
