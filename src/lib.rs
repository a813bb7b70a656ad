//! Cmd Notebook - command snippet notebook engine
//!
//! Organizes shell command snippets into pages of titled blocks. The
//! [`Store`] owns the single live document, applies structural edits with
//! undo/redo, notifies subscribers and persists every change in the
//! background.

pub mod core;
pub mod error;
pub mod storage;

pub use crate::core::config::AppConfig;
pub use crate::core::events::SubscriptionId;
pub use crate::core::model::{Block, Command, Document, Page, SCHEMA_VERSION};
pub use crate::core::normalize::{normalize, normalize_str};
pub use crate::core::ops::DropPosition;
pub use crate::core::store::{Checkpoint, Store};
pub use crate::error::{ImportError, StorageError};
