use std::fmt;
use std::path::PathBuf;

use crate::kernel::services::ports::StorageError;
use crate::models::{NameError, NoteTreeError};

/// Failures surfaced by navigator operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Target path already exists in storage.
    NameConflict(PathBuf),
    /// Any other storage failure.
    Io { path: PathBuf, message: String },
    /// The referenced path is not (or no longer) in the tree.
    NotFound(PathBuf),
    NotADirectory(PathBuf),
    EmptyName,
    InvalidName(String),
    RootImmutable,
    NoDraft,
    DraftPending,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::NameConflict(path) => write!(f, "{} already exists", path.display()),
            TreeError::Io { path, message } => write!(f, "{}: {message}", path.display()),
            TreeError::NotFound(path) => write!(f, "{} is not in the tree", path.display()),
            TreeError::NotADirectory(path) => write!(f, "{} is not a directory", path.display()),
            TreeError::EmptyName => write!(f, "name must not be empty"),
            TreeError::InvalidName(name) => write!(f, "invalid name: {name:?}"),
            TreeError::RootImmutable => write!(f, "the workspace root cannot be changed"),
            TreeError::NoDraft => write!(f, "no draft is active"),
            TreeError::DraftPending => write!(f, "draft is already being saved"),
        }
    }
}

impl std::error::Error for TreeError {}

impl TreeError {
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, TreeError::NotFound(_))
    }
}

impl From<StorageError> for TreeError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AlreadyExists(path) => TreeError::NameConflict(path),
            StorageError::NotFound(path) => TreeError::Io {
                message: "no such file or directory".to_string(),
                path,
            },
            StorageError::Io { path, message } => TreeError::Io { path, message },
        }
    }
}

impl From<NameError> for TreeError {
    fn from(err: NameError) -> Self {
        match err {
            NameError::Empty => TreeError::EmptyName,
            NameError::Invalid(name) => TreeError::InvalidName(name),
        }
    }
}

/// Model errors reaching the store mean a caller asked for something the tree
/// cannot hold; they are reported against the path involved.
pub(crate) fn tree_error_at(path: PathBuf, err: NoteTreeError) -> TreeError {
    match err {
        NoteTreeError::PathExists(existing) => TreeError::NameConflict(existing),
        NoteTreeError::RootImmutable => TreeError::RootImmutable,
        NoteTreeError::InvalidNodeId => TreeError::NotFound(path),
        other => TreeError::Io {
            path,
            message: other.to_string(),
        },
    }
}
