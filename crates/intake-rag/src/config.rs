//! Configuration for the intake service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main intake service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Background processing configuration
    #[serde(default)]
    pub processing: ProcessingConfig,
}

impl IntakeConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 100MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9621,
            enable_cors: true,
            max_upload_size: 100 * 1024 * 1024, // 100MB
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory uploaded files land in
    pub input_dir: PathBuf,
    /// Directory for service-owned state (status store)
    pub working_dir: PathBuf,
    /// File extensions accepted for upload (leading dot, lowercase)
    #[serde(default = "default_supported_extensions")]
    pub supported_extensions: Vec<String>,
}

impl StorageConfig {
    /// Path of the document status store file
    pub fn doc_status_path(&self) -> PathBuf {
        self.working_dir.join("doc_status.json")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./inputs"),
            working_dir: PathBuf::from("./rag_storage"),
            supported_extensions: default_supported_extensions(),
        }
    }
}

fn default_supported_extensions() -> Vec<String> {
    [
        ".txt", ".md", ".pdf", ".docx", ".pptx", ".xlsx", ".csv", ".html", ".htm", ".json",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Background processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Number of parallel indexing jobs (default: CPU count, max 4)
    pub index_workers: Option<usize>,
    /// Timeout for indexing a single file in seconds (default: 300)
    pub index_timeout_secs: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            index_workers: None, // Auto-detect from CPU count
            index_timeout_secs: 300,
        }
    }
}
