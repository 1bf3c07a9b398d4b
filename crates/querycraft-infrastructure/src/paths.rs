//! Unified path management for QueryCraft files.
//!
//! Directories are resolved through `AppPaths` from version-migrate so they
//! follow the platform conventions (XDG on Linux/macOS).
//!
//! ```text
//! ~/.config/querycraft/            # Config directory
//! └── config.toml                  # Application configuration
//!
//! ~/.local/share/querycraft/       # Data directory
//! └── query-craft-storage.json     # Persisted store state
//! ```

use std::path::{Path, PathBuf};

use querycraft_core::error::{QueryCraftError, Result};
use version_migrate::AppPaths;

/// File name of the persisted store state.
pub const STATE_FILE_NAME: &str = "query-craft-storage.json";

/// File name of the application configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub struct QueryCraftPaths;

impl QueryCraftPaths {
    fn app_paths() -> AppPaths {
        AppPaths::new("querycraft")
    }

    /// Returns the configuration directory (e.g. `~/.config/querycraft/`).
    pub fn config_dir() -> Result<PathBuf> {
        Self::app_paths()
            .config_dir()
            .map_err(|_| QueryCraftError::config("Cannot determine config directory"))
    }

    /// Returns the data directory (e.g. `~/.local/share/querycraft/`).
    pub fn data_dir() -> Result<PathBuf> {
        Self::app_paths()
            .data_dir()
            .map_err(|_| QueryCraftError::config("Cannot determine data directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    pub fn state_file() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join(STATE_FILE_NAME))
    }

    /// State file inside an explicit data directory.
    pub fn state_file_in(data_dir: &Path) -> PathBuf {
        data_dir.join(STATE_FILE_NAME)
    }
}
