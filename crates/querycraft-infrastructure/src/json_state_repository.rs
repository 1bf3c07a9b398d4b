//! File-backed store state repository.
//!
//! The whole state lives in one JSON document (`query-craft-storage.json`)
//! tagged with its schema version and read back through the migrator.

use std::path::{Path, PathBuf};

use querycraft_core::error::{QueryCraftError, Result};
use querycraft_core::state::{StateRepository, StoreState};
use tracing::debug;
use version_migrate::Migrator;

use crate::dto::{STORE_STATE_VERSIONS, create_store_state_migrator};
use crate::paths::QueryCraftPaths;
use crate::storage::AtomicFile;

const ENTITY: &str = "store_state";

/// JSON file repository with version migration support.
pub struct JsonStateRepository {
    file: AtomicFile,
    migrator: Migrator,
}

impl JsonStateRepository {
    /// Uses the default state file in the platform data directory.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(QueryCraftPaths::state_file()?))
    }

    /// Uses the state file inside `data_dir`.
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::with_path(QueryCraftPaths::state_file_in(data_dir.as_ref()))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AtomicFile::new(path),
            migrator: create_store_state_migrator(),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl StateRepository for JsonStateRepository {
    fn load(&self) -> Result<Option<StoreState>> {
        let Some(content) = self.file.read()? else {
            debug!("No saved state at {}", self.path().display());
            return Ok(None);
        };

        let json_value: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            QueryCraftError::serialization(
                "JSON",
                format!("Failed to parse '{}': {}", self.path().display(), e),
            )
        })?;

        if let Some(version) = json_value.get("version").and_then(|v| v.as_str()) {
            if !STORE_STATE_VERSIONS.contains(&version) {
                return Err(QueryCraftError::migration(format!(
                    "'{}' has unsupported schema version {} (known: {})",
                    self.path().display(),
                    version,
                    STORE_STATE_VERSIONS.join(", ")
                )));
            }
        }

        let state: StoreState = self
            .migrator
            .load_flat_from(ENTITY, json_value)
            .map_err(|e| {
                QueryCraftError::migration(format!(
                    "Failed to migrate '{}': {}",
                    self.path().display(),
                    e
                ))
            })?;

        debug!("Loaded state from {}", self.path().display());
        Ok(Some(state))
    }

    fn save(&self, state: &StoreState) -> Result<()> {
        let serialized = self
            .migrator
            .save_domain_flat(ENTITY, state.clone())
            .map_err(|e| {
                QueryCraftError::serialization("JSON", format!("Failed to serialize state: {}", e))
            })?;

        // Re-indent so the file stays readable by hand.
        let json_value: serde_json::Value = serde_json::from_str(&serialized)?;
        let pretty = serde_json::to_string_pretty(&json_value)?;

        self.file.write(&pretty)?;
        debug!("Saved state to {}", self.path().display());
        Ok(())
    }
}
