//! 存储网关端口：目录读取、文件增删改名
//!
//! 树模型只通过这个 trait 访问文件系统，自身不做任何 IO。

use std::fmt;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = StorageResult<T>> + Send + 'a>>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl StorageEntry {
    pub fn new(path: PathBuf, kind: EntryKind) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path, kind }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    AlreadyExists(PathBuf),
    NotFound(PathBuf),
    Io { path: PathBuf, message: String },
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        StorageError::Io {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::AlreadyExists => StorageError::AlreadyExists(path.to_path_buf()),
            io::ErrorKind::NotFound => StorageError::NotFound(path.to_path_buf()),
            _ => StorageError::io(path, err.to_string()),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::AlreadyExists(path) => write!(f, "already exists: {}", path.display()),
            StorageError::NotFound(path) => write!(f, "not found: {}", path.display()),
            StorageError::Io { path, message } => {
                write!(f, "io error at {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Filesystem capability set consumed by the navigator.
///
/// Every call may fail; `create_file`, `create_folder` and `rename` report an
/// occupied target as [`StorageError::AlreadyExists`].
pub trait StorageGateway: Send + Sync {
    /// Asks the host for a workspace folder; `None` when the user declines.
    fn open_folder(&self) -> GatewayFuture<'_, Option<PathBuf>>;

    fn read_directory<'a>(&'a self, path: &'a Path) -> GatewayFuture<'a, Vec<StorageEntry>>;

    fn read_file<'a>(&'a self, path: &'a Path) -> GatewayFuture<'a, String>;

    fn write_file<'a>(&'a self, path: &'a Path, content: &'a str) -> GatewayFuture<'a, ()>;

    /// Returns the created file's path.
    fn create_file<'a>(
        &'a self,
        dir: &'a Path,
        name: &'a str,
        content: &'a str,
    ) -> GatewayFuture<'a, PathBuf>;

    fn create_folder<'a>(&'a self, path: &'a Path) -> GatewayFuture<'a, ()>;

    fn rename<'a>(&'a self, from: &'a Path, to: &'a Path) -> GatewayFuture<'a, ()>;

    fn delete_recursive<'a>(&'a self, path: &'a Path) -> GatewayFuture<'a, ()>;
}
