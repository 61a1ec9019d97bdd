//! Application context for CLI command execution.
//!
//! [`App`] finds the workspace, loads its configuration, opens the store,
//! and wires up the [`DependencyManager`].
//!
//! # Example
//!
//! ```no_run
//! use sanad::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     // Execute commands using app...
//!     app.save().await?;
//!     Ok(())
//! }
//! ```

use crate::access::ProjectMembership;
use crate::config::{CONFIG_FILE_NAME, SANAD_DIR_NAME, SanadConfig, find_sanad_root};
use crate::error::{ConfigError, Result};
use crate::manager::DependencyManager;
use crate::storage::{MilestoneStore, create_store};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Application context for CLI operations.
pub struct App {
    manager: DependencyManager,
    sanad_dir: PathBuf,
    config: SanadConfig,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("sanad_dir", &self.sanad_dir)
            .field("config", &self.config)
            .field("manager", &self.manager)
            .finish()
    }
}

impl App {
    /// Create an App from the given working directory.
    ///
    /// Searches up the directory tree for `.sanad/`, loads the config, and
    /// opens the configured store.
    ///
    /// # Errors
    ///
    /// - `ConfigError::NotInitialized` if no workspace is found
    /// - configuration or storage errors while loading
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_sanad_root(working_dir).ok_or(ConfigError::NotInitialized)?;
        let sanad_dir = root_dir.join(SANAD_DIR_NAME);
        let config = SanadConfig::load(&sanad_dir.join(CONFIG_FILE_NAME)).await?;

        let backend = config.storage.to_backend(&root_dir)?;
        let store = create_store(backend).await?;
        let manager = DependencyManager::new(store, Arc::new(ProjectMembership))
            .with_mode(config.propagation.mode);

        tracing::debug!(
            root = %root_dir.display(),
            mode = %config.propagation.mode,
            "Opened workspace"
        );

        Ok(Self {
            manager,
            sanad_dir,
            config,
        })
    }

    /// The dependency manager.
    pub fn manager(&self) -> &DependencyManager {
        &self.manager
    }

    /// The store behind the manager.
    pub fn store(&self) -> &Arc<dyn MilestoneStore> {
        self.manager.store()
    }

    /// Loaded configuration.
    pub fn config(&self) -> &SanadConfig {
        &self.config
    }

    /// Path to the `.sanad` directory.
    pub fn sanad_dir(&self) -> &Path {
        &self.sanad_dir
    }

    /// Save storage state to persistent storage.
    ///
    /// Call this after any mutating operation.
    pub async fn save(&self) -> Result<()> {
        self.store().save().await
    }
}
