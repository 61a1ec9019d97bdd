//! Implementation of the `init` command.
//!
//! Creates the `.sanad/` directory with a configuration file, an empty graph
//! data file, and a `.gitignore`.

use crate::config::{CONFIG_FILE_NAME, DATA_FILE_NAME, SANAD_DIR_NAME, SanadConfig};
use crate::error::{ConfigError, Result};
use crate::manager::PropagationMode;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the gitignore file within .sanad
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created sanad directory
    pub sanad_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created data file
    pub data_file: PathBuf,
    /// Path to the created gitignore file
    pub gitignore_file: PathBuf,
    /// Propagation mode written to the config
    pub mode: PropagationMode,
}

/// Initialize a new sanad workspace in `base_dir`.
///
/// # Errors
///
/// Returns an error if:
/// - The `.sanad/` directory already exists
/// - File system operations fail
pub async fn init(base_dir: &Path, mode: Option<PropagationMode>) -> Result<InitResult> {
    let sanad_dir = base_dir.join(SANAD_DIR_NAME);

    if fs::try_exists(&sanad_dir).await? {
        return Err(ConfigError::AlreadyInitialized(SANAD_DIR_NAME.to_string()).into());
    }

    fs::create_dir_all(&sanad_dir).await?;

    let config_file = sanad_dir.join(CONFIG_FILE_NAME);
    let mut config = SanadConfig::default();
    config.propagation.mode = mode.unwrap_or_default();
    config.save(&config_file).await?;

    let data_file = sanad_dir.join(DATA_FILE_NAME);
    fs::write(&data_file, "").await?;

    let gitignore_file = sanad_dir.join(GITIGNORE_FILE_NAME);
    let gitignore_content = "\
# Temporary files left by interrupted saves
*.tmp
";
    fs::write(&gitignore_file, gitignore_content).await?;

    tracing::info!(path = %sanad_dir.display(), mode = %config.propagation.mode, "Initialized workspace");

    Ok(InitResult {
        sanad_dir,
        config_file,
        data_file,
        gitignore_file,
        mode: config.propagation.mode,
    })
}

/// Returns `true` if `base_dir` contains a `.sanad/` directory.
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(SANAD_DIR_NAME).exists()
}
