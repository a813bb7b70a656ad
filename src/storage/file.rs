//! File-backed persistence gateway

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::backup::create_backup_if_changed;
use super::data_dir::{backup_dir_path, data_file_path};
use super::PersistenceGateway;
use crate::core::config::AppConfig;
use crate::error::{StorageError, StorageResult};

/// Write `content` to `path` through a temporary sibling and a rename
pub fn write_atomic(path: &Path, content: &str) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| StorageError::io(format!("failed to create {}", parent.display()), e))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, content)
        .map_err(|e| StorageError::io(format!("failed to write {}", tmp.display()), e))?;
    fs::rename(&tmp, path)
        .map_err(|e| StorageError::io(format!("failed to replace {}", path.display()), e))?;
    Ok(())
}

/// Stores the notebook as `cmd_notebook.json` in a data directory, keeping
/// rotating backups in `.backup` next to it.
#[derive(Debug, Clone)]
pub struct FileGateway {
    data_file: PathBuf,
    backup_dir: PathBuf,
    backup_count: usize,
}

impl FileGateway {
    pub fn new(data_dir: &Path, backup_count: usize) -> Self {
        Self {
            data_file: data_file_path(data_dir),
            backup_dir: backup_dir_path(data_dir),
            backup_count,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.data_dir, config.backup_count)
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }
}

impl PersistenceGateway for FileGateway {
    fn load(&mut self) -> StorageResult<Option<String>> {
        if let Some(parent) = self.data_file.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::io("failed to create data directory", e))?;
        }

        match fs::read_to_string(&self.data_file) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(
                format!("failed to read {}", self.data_file.display()),
                e,
            )),
        }
    }

    fn save(&mut self, data: &str) -> StorageResult<()> {
        if let Some(parent) = self.data_file.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::io("failed to create data directory", e))?;
        }

        create_backup_if_changed(&self.data_file, &self.backup_dir, data, self.backup_count)?;
        write_atomic(&self.data_file, data)
    }
}
