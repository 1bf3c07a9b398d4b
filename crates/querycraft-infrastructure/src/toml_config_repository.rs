//! TOML-based application configuration.
//!
//! Reads `config.toml` from the config directory. A missing file means
//! defaults; unknown keys are ignored and missing keys take their defaults.

use std::path::{Path, PathBuf};

use querycraft_core::config::AppConfig;
use querycraft_core::error::Result;
use tracing::{debug, info};

use crate::paths::QueryCraftPaths;
use crate::storage::AtomicFile;

pub struct TomlConfigRepository {
    file: AtomicFile,
}

impl TomlConfigRepository {
    /// Uses `config.toml` in the platform config directory.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(QueryCraftPaths::config_file()?))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AtomicFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Loads the configuration, falling back to defaults when the file is absent.
    pub fn load(&self) -> Result<AppConfig> {
        match self.file.read()? {
            Some(content) => {
                let config: AppConfig = toml::from_str(&content)?;
                debug!("Loaded config from {}", self.path().display());
                Ok(config)
            }
            None => {
                debug!("No config at {}, using defaults", self.path().display());
                Ok(AppConfig::default())
            }
        }
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        let content = toml::to_string_pretty(config)?;
        self.file.write(&content)?;
        info!("Saved config to {}", self.path().display());
        Ok(())
    }

    /// Loads the configuration, writing the defaults first if no file exists.
    pub fn load_or_init(&self) -> Result<AppConfig> {
        if self.file.read()?.is_none() {
            self.save(&AppConfig::default())?;
        }
        self.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querycraft_core::config::{LinkPolicy, ReplyStyle};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlConfigRepository::with_path(temp_dir.path().join("config.toml"));

        assert_eq!(repo.load().unwrap(), AppConfig::default());
        assert!(!repo.path().exists());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlConfigRepository::with_path(temp_dir.path().join("config.toml"));

        let mut config = AppConfig::default();
        config.store.link_policy = LinkPolicy::Strict;
        config.reply.style = ReplyStyle::Genomics;
        config.reply.delay_ms = 0;
        repo.save(&config).unwrap();

        assert_eq!(repo.load().unwrap(), config);
    }

    #[test]
    fn test_load_or_init_writes_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlConfigRepository::with_path(temp_dir.path().join("config.toml"));

        let config = repo.load_or_init().unwrap();

        assert_eq!(config, AppConfig::default());
        let content = fs::read_to_string(repo.path()).unwrap();
        assert!(content.contains("linkPolicy"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "logLevel = ").unwrap();

        let err = TomlConfigRepository::with_path(path).load().unwrap_err();
        assert!(err.is_serialization());
    }
}
