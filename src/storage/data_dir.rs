//! Data directory inspection and switching

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::backup::backup_file;
use crate::core::config::AppConfig;
use crate::error::{StorageError, StorageResult};

/// Name of the notebook data file inside the data directory
pub const DATA_FILE: &str = "cmd_notebook.json";

/// Name of the backup folder inside the data directory
pub const BACKUP_DIR: &str = ".backup";

pub fn data_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DATA_FILE)
}

pub fn backup_dir_path(data_dir: &Path) -> PathBuf {
    data_dir.join(BACKUP_DIR)
}

/// Summary of the configured data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataDirInfo {
    pub path: String,
    pub is_default: bool,
    pub data_file_exists: bool,
    pub is_writable: bool,
}

/// What a candidate data directory looks like
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SwitchDirCheck {
    EmptyDir,
    HasExistingData {
        #[serde(rename = "lastModified")]
        last_modified: String,
    },
    Invalid {
        reason: String,
    },
}

/// How to treat data when moving to another directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "action")]
pub enum SwitchDirAction {
    /// Copy the current notebook into the new directory
    CopyToNew,
    /// Adopt the notebook already in the new directory
    UseExisting,
    Cancel,
}

pub fn data_dir_info(config: &AppConfig, default_dir: &Path) -> DataDirInfo {
    DataDirInfo {
        path: config.data_dir.to_string_lossy().to_string(),
        is_default: config.data_dir == default_dir,
        data_file_exists: data_file_path(&config.data_dir).exists(),
        is_writable: is_dir_writable(&config.data_dir),
    }
}

/// Probe a directory by creating it if needed and writing a marker file
pub fn is_dir_writable(path: &Path) -> bool {
    if !path.exists() && fs::create_dir_all(path).is_err() {
        return false;
    }

    let marker = path.join(".write_test");
    if fs::write(&marker, "test").is_ok() {
        let _ = fs::remove_file(&marker);
        true
    } else {
        false
    }
}

pub fn check_target_dir(path: &Path) -> SwitchDirCheck {
    if !path.exists() && fs::create_dir_all(path).is_err() {
        return SwitchDirCheck::Invalid {
            reason: "could not create directory".to_string(),
        };
    }

    if !path.is_dir() {
        return SwitchDirCheck::Invalid {
            reason: "path is not a directory".to_string(),
        };
    }

    if !is_dir_writable(path) {
        return SwitchDirCheck::Invalid {
            reason: "directory is not writable".to_string(),
        };
    }

    let data_file = data_file_path(path);
    if !data_file.exists() {
        return SwitchDirCheck::EmptyDir;
    }

    let last_modified = fs::metadata(&data_file)
        .and_then(|meta| meta.modified())
        .map(|time| {
            let time: DateTime<Local> = time.into();
            time.format("%Y-%m-%d %H:%M:%S").to_string()
        })
        .unwrap_or_else(|_| "unknown".to_string());
    SwitchDirCheck::HasExistingData { last_modified }
}

/// Point `config` at `new_dir`, moving or preserving data per `action`
///
/// Returns `false` when cancelled. The caller persists the updated config.
pub fn switch_data_dir(
    config: &mut AppConfig,
    new_dir: &Path,
    action: SwitchDirAction,
) -> StorageResult<bool> {
    tracing::info!("Switching data directory to {} ({:?})", new_dir.display(), action);

    if action == SwitchDirAction::Cancel {
        return Ok(false);
    }
    if let SwitchDirCheck::Invalid { reason } = check_target_dir(new_dir) {
        return Err(StorageError::InvalidDataDir(reason));
    }

    let current_data = data_file_path(&config.data_dir);
    match action {
        SwitchDirAction::CopyToNew => {
            if current_data.exists() {
                let target = data_file_path(new_dir);
                // Keep whatever was already there recoverable
                backup_file(&target, &backup_dir_path(new_dir))?;
                fs::copy(&current_data, &target)
                    .map_err(|e| StorageError::io("failed to copy data file", e))?;
            }
        }
        SwitchDirAction::UseExisting => {
            backup_file(&current_data, &backup_dir_path(&config.data_dir))?;
        }
        SwitchDirAction::Cancel => {}
    }

    config.data_dir = new_dir.to_path_buf();
    Ok(true)
}

/// Return to the default data directory, backing up custom-directory data
pub fn reset_data_dir(config: &mut AppConfig, default_dir: &Path) -> StorageResult<()> {
    if config.data_dir != default_dir {
        let current_data = data_file_path(&config.data_dir);
        backup_file(&current_data, &backup_dir_path(&config.data_dir))?;
    }

    config.data_dir = default_dir.to_path_buf();
    tracing::info!("Reset data directory to {}", default_dir.display());
    Ok(())
}
