//! Storage of work items as markdown files with YAML frontmatter.
//!
//! The consolidation engine only ever talks to [`ItemStore`]; the concrete
//! [`MarkdownStore`] maps items onto the `items/<bucket>/*.md` layout.

pub mod frontmatter;
mod markdown;

pub use markdown::{ARCHIVE_DIR, BUCKETS, MarkdownStore};

use crate::error::ErrorCode;
use crate::model::WorkItem;
use std::path::{Path, PathBuf};

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("items directory not found: {}", .0.display())]
    MissingItemsDir(PathBuf),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid frontmatter in {}: {reason}", path.display())]
    Frontmatter { path: PathBuf, reason: String },

    #[error("invalid YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Machine-readable code for this error when it surfaces while loading.
    ///
    /// Write-side failures are reported through the caller's own error type.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MissingItemsDir(_) => ErrorCode::ItemsDirMissing,
            Self::Io { .. } => ErrorCode::LoadFailed,
            Self::Frontmatter { .. } | Self::Yaml { .. } => ErrorCode::InvalidFrontmatter,
        }
    }
}

/// The persistence interface consumed by the consolidation engine.
///
/// Implementations are used from a single thread for the duration of one
/// run; no locking is expected.
pub trait ItemStore {
    /// Load every item in the schedule buckets, regardless of type or status.
    ///
    /// # Errors
    ///
    /// Returns an error if any item cannot be read or parsed.
    fn list_all_work_items(&self) -> Result<Vec<WorkItem>, StoreError>;

    /// Persist `item` at `item.path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write_work_item(&self, item: &WorkItem) -> Result<(), StoreError>;

    /// Persist `item` at a path that must not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if a file is already present at `item.path` or the
    /// file cannot be written.
    fn create_work_item(&self, item: &WorkItem) -> Result<(), StoreError>;

    /// Whether anything already occupies `path`.
    fn path_exists(&self, path: &Path) -> bool;

    /// Delete the file at `path`. A file that is already gone is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    fn remove_work_item(&self, path: &Path) -> Result<(), StoreError>;

    /// Directory that receives merged-away items.
    fn archive_dir(&self) -> PathBuf;
}
