//! 内存网关：测试与演示用，记录调用并支持注入一次性故障

use std::collections::BTreeMap;
use std::future::ready;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rustc_hash::FxHashMap;

use crate::kernel::services::ports::{
    EntryKind, GatewayFuture, StorageEntry, StorageError, StorageGateway, StorageResult,
};
use crate::models::note_path::{is_same_or_within, rebase};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    OpenFolder,
    ReadDirectory,
    ReadFile,
    WriteFile,
    CreateFile,
    CreateFolder,
    Rename,
    DeleteRecursive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    OpenFolder,
    ReadDirectory(PathBuf),
    ReadFile(PathBuf),
    WriteFile(PathBuf),
    CreateFile(PathBuf),
    CreateFolder(PathBuf),
    Rename(PathBuf, PathBuf),
    DeleteRecursive(PathBuf),
}

impl GatewayCall {
    pub fn op(&self) -> GatewayOp {
        match self {
            GatewayCall::OpenFolder => GatewayOp::OpenFolder,
            GatewayCall::ReadDirectory(_) => GatewayOp::ReadDirectory,
            GatewayCall::ReadFile(_) => GatewayOp::ReadFile,
            GatewayCall::WriteFile(_) => GatewayOp::WriteFile,
            GatewayCall::CreateFile(_) => GatewayOp::CreateFile,
            GatewayCall::CreateFolder(_) => GatewayOp::CreateFolder,
            GatewayCall::Rename(..) => GatewayOp::Rename,
            GatewayCall::DeleteRecursive(_) => GatewayOp::DeleteRecursive,
        }
    }

    /// Calls that change storage.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            GatewayCall::OpenFolder | GatewayCall::ReadDirectory(_) | GatewayCall::ReadFile(_)
        )
    }
}

#[derive(Debug, Clone)]
enum MemoryEntry {
    File(String),
    Directory,
}

#[derive(Debug, Default)]
struct MemoryFs {
    entries: BTreeMap<PathBuf, MemoryEntry>,
    calls: Vec<GatewayCall>,
    failures: FxHashMap<GatewayOp, StorageError>,
    picked_folder: Option<PathBuf>,
}

impl MemoryFs {
    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entries.get(path), Some(MemoryEntry::Directory))
    }

    fn require_parent_dir(&self, path: &Path) -> StorageResult<()> {
        match path.parent() {
            Some(parent) if self.is_dir(parent) => Ok(()),
            Some(parent) => Err(StorageError::NotFound(parent.to_path_buf())),
            None => Err(StorageError::io(path, "path has no parent")),
        }
    }

    fn require_vacant(&self, path: &Path) -> StorageResult<()> {
        if self.entries.contains_key(path) {
            return Err(StorageError::AlreadyExists(path.to_path_buf()));
        }
        Ok(())
    }

    fn insert_with_ancestors(&mut self, path: &Path, entry: MemoryEntry) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.entries
                .entry(ancestor.to_path_buf())
                .or_insert(MemoryEntry::Directory);
        }
        self.entries.insert(path.to_path_buf(), entry);
    }

    fn run(&mut self, call: GatewayCall) -> StorageResult<Option<Vec<StorageEntry>>> {
        let op = call.op();
        self.calls.push(call.clone());
        if let Some(err) = self.failures.remove(&op) {
            return Err(err);
        }

        match call {
            GatewayCall::OpenFolder | GatewayCall::ReadFile(_) => Ok(None),
            GatewayCall::ReadDirectory(path) => {
                if !self.is_dir(&path) {
                    return Err(StorageError::NotFound(path));
                }
                let listing = self
                    .entries
                    .iter()
                    .filter(|(p, _)| p.parent() == Some(path.as_path()))
                    .map(|(p, entry)| {
                        let kind = match entry {
                            MemoryEntry::File(_) => EntryKind::File,
                            MemoryEntry::Directory => EntryKind::Directory,
                        };
                        StorageEntry::new(p.clone(), kind)
                    })
                    .collect();
                Ok(Some(listing))
            }
            GatewayCall::WriteFile(path) => {
                if self.is_dir(&path) {
                    return Err(StorageError::io(path, "is a directory"));
                }
                self.require_parent_dir(&path)?;
                Ok(None)
            }
            GatewayCall::CreateFile(path) => {
                self.require_parent_dir(&path)?;
                self.require_vacant(&path)?;
                Ok(None)
            }
            GatewayCall::CreateFolder(path) => {
                self.require_parent_dir(&path)?;
                self.require_vacant(&path)?;
                self.entries.insert(path, MemoryEntry::Directory);
                Ok(None)
            }
            GatewayCall::Rename(from, to) => {
                if !self.entries.contains_key(&from) {
                    return Err(StorageError::NotFound(from));
                }
                self.require_parent_dir(&to)?;
                self.require_vacant(&to)?;
                let moved: Vec<PathBuf> = self
                    .entries
                    .keys()
                    .filter(|p| is_same_or_within(p, &from))
                    .cloned()
                    .collect();
                for path in moved {
                    if let (Some(entry), Some(target)) =
                        (self.entries.remove(&path), rebase(&path, &from, &to))
                    {
                        self.entries.insert(target, entry);
                    }
                }
                Ok(None)
            }
            GatewayCall::DeleteRecursive(path) => {
                if !self.entries.contains_key(&path) {
                    return Err(StorageError::NotFound(path));
                }
                self.entries.retain(|p, _| !is_same_or_within(p, &path));
                Ok(None)
            }
        }
    }
}

/// In-memory storage with a call log and one-shot fault injection.
#[derive(Debug, Default)]
pub struct MemoryStorageGateway {
    fs: Mutex<MemoryFs>,
}

impl MemoryStorageGateway {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let gateway = Self::default();
        gateway.add_dir(root);
        gateway
    }

    fn fs(&self) -> MutexGuard<'_, MemoryFs> {
        self.fs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a directory (and any missing ancestors) without logging a call.
    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        let path: PathBuf = path.into();
        self.fs().insert_with_ancestors(&path, MemoryEntry::Directory);
    }

    /// Adds a file (and any missing ancestor directories) without logging a call.
    pub fn add_file(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        let path: PathBuf = path.into();
        self.fs()
            .insert_with_ancestors(&path, MemoryEntry::File(content.into()));
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.fs().entries.contains_key(path)
    }

    pub fn is_dir(&self, path: &Path) -> bool {
        self.fs().is_dir(path)
    }

    pub fn file_content(&self, path: &Path) -> Option<String> {
        match self.fs().entries.get(path) {
            Some(MemoryEntry::File(content)) => Some(content.clone()),
            _ => None,
        }
    }

    pub fn set_picked_folder(&self, folder: Option<PathBuf>) {
        self.fs().picked_folder = folder;
    }

    /// The next call of kind `op` fails with `error`.
    pub fn fail_next(&self, op: GatewayOp, error: StorageError) {
        self.fs().failures.insert(op, error);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.fs().calls.clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.fs().calls.iter().filter(|c| c.is_mutation()).count()
    }

    pub fn clear_calls(&self) {
        self.fs().calls.clear();
    }
}

impl StorageGateway for MemoryStorageGateway {
    fn open_folder(&self) -> GatewayFuture<'_, Option<PathBuf>> {
        let mut fs = self.fs();
        let result = fs
            .run(GatewayCall::OpenFolder)
            .map(|_| fs.picked_folder.clone());
        Box::pin(ready(result))
    }

    fn read_directory<'a>(&'a self, path: &'a Path) -> GatewayFuture<'a, Vec<StorageEntry>> {
        let result = self
            .fs()
            .run(GatewayCall::ReadDirectory(path.to_path_buf()))
            .map(Option::unwrap_or_default);
        Box::pin(ready(result))
    }

    fn read_file<'a>(&'a self, path: &'a Path) -> GatewayFuture<'a, String> {
        let mut fs = self.fs();
        let result = fs
            .run(GatewayCall::ReadFile(path.to_path_buf()))
            .and_then(|_| match fs.entries.get(path) {
                Some(MemoryEntry::File(content)) => Ok(content.clone()),
                Some(MemoryEntry::Directory) => Err(StorageError::io(path, "is a directory")),
                None => Err(StorageError::NotFound(path.to_path_buf())),
            });
        Box::pin(ready(result))
    }

    fn write_file<'a>(&'a self, path: &'a Path, content: &'a str) -> GatewayFuture<'a, ()> {
        let mut fs = self.fs();
        let result = fs.run(GatewayCall::WriteFile(path.to_path_buf())).map(|_| {
            fs.entries
                .insert(path.to_path_buf(), MemoryEntry::File(content.to_string()));
        });
        Box::pin(ready(result))
    }

    fn create_file<'a>(
        &'a self,
        dir: &'a Path,
        name: &'a str,
        content: &'a str,
    ) -> GatewayFuture<'a, PathBuf> {
        let path = dir.join(name);
        let mut fs = self.fs();
        let result = fs.run(GatewayCall::CreateFile(path.clone())).map(|_| {
            fs.entries
                .insert(path.clone(), MemoryEntry::File(content.to_string()));
            path
        });
        Box::pin(ready(result))
    }

    fn create_folder<'a>(&'a self, path: &'a Path) -> GatewayFuture<'a, ()> {
        let result = self
            .fs()
            .run(GatewayCall::CreateFolder(path.to_path_buf()))
            .map(drop);
        Box::pin(ready(result))
    }

    fn rename<'a>(&'a self, from: &'a Path, to: &'a Path) -> GatewayFuture<'a, ()> {
        let result = self
            .fs()
            .run(GatewayCall::Rename(from.to_path_buf(), to.to_path_buf()))
            .map(drop);
        Box::pin(ready(result))
    }

    fn delete_recursive<'a>(&'a self, path: &'a Path) -> GatewayFuture<'a, ()> {
        let result = self
            .fs()
            .run(GatewayCall::DeleteRecursive(path.to_path_buf()))
            .map(drop);
        Box::pin(ready(result))
    }
}
