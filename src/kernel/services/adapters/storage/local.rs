//! 本地文件系统网关
//!
//! 基于 tokio::fs 实现 StorageGateway；已存在的目标统一报告为 AlreadyExists。

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::kernel::services::ports::{
    EntryKind, GatewayFuture, StorageEntry, StorageError, StorageGateway, StorageResult,
};

/// Headless hosts have no folder picker; `open_folder` answers with the folder
/// configured here, if any.
#[derive(Debug, Clone, Default)]
pub struct LocalStorageGateway {
    picked_folder: Option<PathBuf>,
}

impl LocalStorageGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_picked_folder(folder: impl Into<PathBuf>) -> Self {
        Self {
            picked_folder: Some(folder.into()),
        }
    }
}

async fn read_directory(path: &Path) -> StorageResult<Vec<StorageEntry>> {
    let mut dir = tokio::fs::read_dir(path)
        .await
        .map_err(|e| StorageError::from_io(path, e))?;

    let mut entries = Vec::new();
    while let Some(entry) = dir
        .next_entry()
        .await
        .map_err(|e| StorageError::from_io(path, e))?
    {
        let entry_path = entry.path();
        // Follow symlinks; a dangling link is listed as a file.
        let is_dir = match tokio::fs::metadata(&entry_path).await {
            Ok(meta) => meta.is_dir(),
            Err(_) => false,
        };
        let kind = if is_dir {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        entries.push(StorageEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry_path,
            kind,
        });
    }
    Ok(entries)
}

async fn create_file(dir: &Path, name: &str, content: &str) -> StorageResult<PathBuf> {
    let path = dir.join(name);
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(|e| StorageError::from_io(&path, e))?;
    file.write_all(content.as_bytes())
        .await
        .map_err(|e| StorageError::from_io(&path, e))?;
    file.flush()
        .await
        .map_err(|e| StorageError::from_io(&path, e))?;
    Ok(path)
}

async fn rename(from: &Path, to: &Path) -> StorageResult<()> {
    // fs::rename silently replaces files on unix.
    let occupied = tokio::fs::try_exists(to)
        .await
        .map_err(|e| StorageError::from_io(to, e))?;
    if occupied {
        return Err(StorageError::AlreadyExists(to.to_path_buf()));
    }
    tokio::fs::rename(from, to)
        .await
        .map_err(|e| StorageError::from_io(from, e))
}

async fn delete_recursive(path: &Path) -> StorageResult<()> {
    let meta = tokio::fs::symlink_metadata(path)
        .await
        .map_err(|e| StorageError::from_io(path, e))?;
    let result = if meta.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };
    result.map_err(|e| StorageError::from_io(path, e))
}

impl StorageGateway for LocalStorageGateway {
    fn open_folder(&self) -> GatewayFuture<'_, Option<PathBuf>> {
        Box::pin(async move { Ok(self.picked_folder.clone()) })
    }

    fn read_directory<'a>(&'a self, path: &'a Path) -> GatewayFuture<'a, Vec<StorageEntry>> {
        Box::pin(read_directory(path))
    }

    fn read_file<'a>(&'a self, path: &'a Path) -> GatewayFuture<'a, String> {
        Box::pin(async move {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| StorageError::from_io(path, e))
        })
    }

    fn write_file<'a>(&'a self, path: &'a Path, content: &'a str) -> GatewayFuture<'a, ()> {
        Box::pin(async move {
            tokio::fs::write(path, content)
                .await
                .map_err(|e| StorageError::from_io(path, e))
        })
    }

    fn create_file<'a>(
        &'a self,
        dir: &'a Path,
        name: &'a str,
        content: &'a str,
    ) -> GatewayFuture<'a, PathBuf> {
        Box::pin(create_file(dir, name, content))
    }

    fn create_folder<'a>(&'a self, path: &'a Path) -> GatewayFuture<'a, ()> {
        Box::pin(async move {
            tokio::fs::create_dir(path)
                .await
                .map_err(|e| StorageError::from_io(path, e))
        })
    }

    fn rename<'a>(&'a self, from: &'a Path, to: &'a Path) -> GatewayFuture<'a, ()> {
        Box::pin(rename(from, to))
    }

    fn delete_recursive<'a>(&'a self, path: &'a Path) -> GatewayFuture<'a, ()> {
        Box::pin(delete_recursive(path))
    }
}
