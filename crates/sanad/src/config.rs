//! Configuration for a sanad workspace.
//!
//! A workspace is a directory containing `.sanad/config.yaml`:
//!
//! ```yaml
//! storage:
//!   backend: memory
//!   data-file: .sanad/graph.jsonl
//! propagation:
//!   mode: direct
//! ```
//!
//! `backend: memory` keeps the graph in memory and persists it to the
//! JSONL data file after each mutating command. `propagation.mode` is
//! `direct` (one hop, the default) or `cascade`.

use crate::error::{ConfigError, Result, StorageError};
use crate::manager::PropagationMode;
use crate::storage::StorageBackend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the sanad directory
pub const SANAD_DIR_NAME: &str = ".sanad";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the graph data file
pub const DATA_FILE_NAME: &str = "graph.jsonl";

/// Environment variable naming the acting user
pub const USER_ENV_VAR: &str = "SANAD_USER";

/// Storage backend name for in-memory storage with JSONL persistence
pub const MEMORY_BACKEND: &str = "memory";

/// Maximum directory depth to traverse when searching for the sanad root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SanadConfig {
    /// Storage configuration
    pub storage: StorageConfig,

    /// Propagation configuration
    #[serde(default)]
    pub propagation: PropagationConfig,
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Storage backend type ("memory" for in-memory with JSONL persistence)
    pub backend: String,

    /// Path to the data file, relative to the workspace root
    pub data_file: String,
}

/// Propagation configuration section
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PropagationConfig {
    /// How far status changes travel
    #[serde(default)]
    pub mode: PropagationMode,
}

impl StorageConfig {
    /// Resolve the storage backend for a workspace rooted at `root_dir`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UnsupportedBackend` for unknown backends.
    pub fn to_backend(&self, root_dir: &Path) -> Result<StorageBackend> {
        match self.backend.as_str() {
            MEMORY_BACKEND => Ok(StorageBackend::Jsonl(root_dir.join(&self.data_file))),
            other => Err(StorageError::UnsupportedBackend(other.to_string()).into()),
        }
    }
}

impl SanadConfig {
    /// Load and validate configuration from a file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self = serde_yaml::from_str(&content).map_err(ConfigError::Yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).map_err(ConfigError::Yaml)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Check configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the data file path is empty or the
    /// backend is unknown.
    pub fn validate(&self) -> Result<()> {
        if self.storage.data_file.trim().is_empty() {
            return Err(ConfigError::Invalid("storage.data-file cannot be empty".to_string()).into());
        }
        if self.storage.backend != MEMORY_BACKEND {
            return Err(ConfigError::Invalid(format!(
                "Unknown storage backend '{}' (expected '{MEMORY_BACKEND}')",
                self.storage.backend
            ))
            .into());
        }
        Ok(())
    }
}

impl Default for SanadConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                backend: MEMORY_BACKEND.to_string(),
                data_file: format!("{SANAD_DIR_NAME}/{DATA_FILE_NAME}"),
            },
            propagation: PropagationConfig::default(),
        }
    }
}

/// Find the workspace root by searching up the directory tree.
///
/// Returns the directory containing `.sanad/`, or `None` if there is none
/// within [`MAX_TRAVERSAL_DEPTH`] levels.
pub fn find_sanad_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(SANAD_DIR_NAME).is_dir() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}
