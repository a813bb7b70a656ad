//! Rotating backups of the notebook data file

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::error::{StorageError, StorageResult};

const BACKUP_PREFIX: &str = "cmd_notebook_";
const BACKUP_EXT: &str = ".json";

/// A backup file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub size: u64,
}

/// `cmd_notebook_YYYYMMDD_HHMMSS.json`
pub fn backup_filename(at: DateTime<Local>) -> String {
    format!(
        "{}{}{}",
        BACKUP_PREFIX,
        at.format("%Y%m%d_%H%M%S"),
        BACKUP_EXT
    )
}

fn is_backup_name(name: &str) -> bool {
    name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_EXT)
}

/// Timestamp and same-second sequence encoded in a backup name
///
/// `cmd_notebook_20240101_000000.json` is sequence 1, the `_2`, `_3`, ...
/// suffixed copies made within the same second follow it numerically.
fn backup_sequence(path: &Path) -> (String, u32) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name
        .strip_prefix(BACKUP_PREFIX)
        .and_then(|n| n.strip_suffix(BACKUP_EXT))
        .unwrap_or(&name);

    // YYYYMMDD_HHMMSS
    const STAMP_LEN: usize = 15;
    if let (Some(stamp), Some(rest)) = (stem.get(..STAMP_LEN), stem.get(STAMP_LEN..)) {
        if let Some(n) = rest.strip_prefix('_').and_then(|n| n.parse().ok()) {
            return (stamp.to_string(), n);
        }
    }
    (stem.to_string(), 1)
}

/// Pick a backup path for now, suffixing when the second is already taken
fn next_backup_path(backup_dir: &Path) -> PathBuf {
    let name = backup_filename(Local::now());
    let path = backup_dir.join(&name);
    if !path.exists() {
        return path;
    }

    let stem = name.trim_end_matches(BACKUP_EXT);
    let mut n = 2;
    loop {
        let candidate = backup_dir.join(format!("{}_{}{}", stem, n, BACKUP_EXT));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Copy `source` into `backup_dir`; `None` when there is nothing to back up
pub fn backup_file(source: &Path, backup_dir: &Path) -> StorageResult<Option<PathBuf>> {
    if !source.exists() {
        return Ok(None);
    }

    fs::create_dir_all(backup_dir)
        .map_err(|e| StorageError::io("failed to create backup directory", e))?;

    let backup_path = next_backup_path(backup_dir);
    fs::copy(source, &backup_path).map_err(|e| StorageError::io("failed to create backup", e))?;

    tracing::debug!("Backed up {} to {}", source.display(), backup_path.display());
    Ok(Some(backup_path))
}

/// Back up the data file before it is overwritten with different content,
/// then prune old backups down to `keep`.
pub fn create_backup_if_changed(
    data_path: &Path,
    backup_dir: &Path,
    new_content: &str,
    keep: usize,
) -> StorageResult<Option<PathBuf>> {
    if !data_path.exists() {
        return Ok(None);
    }

    let current = fs::read_to_string(data_path).unwrap_or_default();
    if current == new_content {
        return Ok(None);
    }

    let backup = backup_file(data_path, backup_dir)?;
    cleanup_old_backups(backup_dir, keep)?;
    Ok(backup)
}

/// Backups in `backup_dir`, newest first
pub fn list_backups(backup_dir: &Path) -> StorageResult<Vec<BackupEntry>> {
    if !backup_dir.exists() {
        return Ok(Vec::new());
    }

    let mut backups: Vec<BackupEntry> = fs::read_dir(backup_dir)
        .map_err(|e| StorageError::io("failed to read backup directory", e))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| is_backup_name(&entry.file_name().to_string_lossy()))
        .map(|entry| {
            let meta = entry.metadata().ok();
            BackupEntry {
                path: entry.path(),
                modified: meta.as_ref().and_then(|m| m.modified().ok()),
                size: meta.map(|m| m.len()).unwrap_or(0),
            }
        })
        .collect();

    // Names encode the timestamp and sequence, so they break ties between equal mtimes
    backups.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| backup_sequence(&b.path).cmp(&backup_sequence(&a.path)))
    });
    Ok(backups)
}

/// Delete all but the newest `keep` backups; returns how many were removed
pub fn cleanup_old_backups(backup_dir: &Path, keep: usize) -> StorageResult<usize> {
    let mut removed = 0;
    for backup in list_backups(backup_dir)?.into_iter().skip(keep) {
        match fs::remove_file(&backup.path) {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!("Failed to remove old backup {}: {}", backup.path.display(), e),
        }
    }
    Ok(removed)
}
