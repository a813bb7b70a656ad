//! Error types shared across the notebook library

use std::io;

use thiserror::Error;

/// Why an import was rejected; the live document is left untouched
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("import is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("import does not contain any usable pages")]
    Structure,
}

/// Failures of the persistence gateway and data directory management
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("could not determine the application directories")]
    NoAppDirs,
    #[error("invalid data directory: {0}")]
    InvalidDataDir(String),
}

impl StorageError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
