//! Application configuration management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::storage::data_dir::{backup_dir_path, data_file_path};
use crate::storage::file::write_atomic;

/// Name of the config file inside the platform config directory
pub const CONFIG_FILE: &str = "app_config.json";

/// Backups kept when the config does not say otherwise
pub const DEFAULT_BACKUP_COUNT: usize = 10;

fn default_backup_count() -> usize {
    DEFAULT_BACKUP_COUNT
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the notebook data file; empty means the default
    #[serde(default)]
    pub data_dir: PathBuf,
    /// Number of backups to retain
    #[serde(default = "default_backup_count")]
    pub backup_count: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            backup_count: DEFAULT_BACKUP_COUNT,
        }
    }
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "cmd-notebook", "CmdNotebook")
            .ok_or_else(|| StorageError::NoAppDirs.into())
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join(CONFIG_FILE))
    }

    /// Get the platform data directory used when none is configured
    pub fn default_data_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    /// Load configuration from the platform config directory
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?, &Self::default_data_dir()?)
    }

    /// Load configuration from `path`, creating a default file if missing
    pub fn load_from(path: &Path, default_data_dir: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self {
                data_dir: default_data_dir.to_path_buf(),
                ..Self::default()
            };
            tracing::info!("Creating default config at: {}", path.display());
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Malformed config: {}", path.display()))?;

        if config.data_dir.as_os_str().is_empty() {
            config.data_dir = default_data_dir.to_path_buf();
        }
        tracing::debug!("Using data directory: {}", config.data_dir.display());
        Ok(config)
    }

    /// Save configuration to the platform config directory
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        write_atomic(path, &content)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Path of the notebook data file
    pub fn data_file(&self) -> PathBuf {
        data_file_path(&self.data_dir)
    }

    /// Path of the backup folder
    pub fn backup_dir(&self) -> PathBuf {
        backup_dir_path(&self.data_dir)
    }
}
