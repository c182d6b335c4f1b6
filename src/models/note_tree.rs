//! 笔记树数据模型
//!
//! 工作区目录的内存镜像：slotmap 节点池 + 路径索引 + 展开集合。
//! 目录的子节点按需加载；排序与隐藏文件过滤在读取时计算。

use compact_str::CompactString;
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{new_key_type, SlotMap};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use super::note_path::{self, is_hidden};

new_key_type! { pub struct NodeId; }

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Note,
    Directory,
}

impl NodeKind {
    fn rank(self) -> u8 {
        match self {
            NodeKind::Directory => 0,
            NodeKind::Note => 1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DraftMode {
    Add,
    Rename,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteTreeError {
    InvalidNodeId,
    ParentNotDirectory,
    ParentNotLoaded,
    PathExists(PathBuf),
    RootImmutable,
    NotSibling,
    Inconsistent(String),
}

impl fmt::Display for NoteTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteTreeError::InvalidNodeId => write!(f, "invalid node id"),
            NoteTreeError::ParentNotDirectory => write!(f, "parent is not a directory"),
            NoteTreeError::ParentNotLoaded => write!(f, "parent directory is not loaded"),
            NoteTreeError::PathExists(path) => {
                write!(f, "path already materialized: {}", path.display())
            }
            NoteTreeError::RootImmutable => write!(f, "workspace root cannot be changed"),
            NoteTreeError::NotSibling => write!(f, "target path is not a sibling"),
            NoteTreeError::Inconsistent(msg) => write!(f, "tree inconsistent: {msg}"),
        }
    }
}

impl std::error::Error for NoteTreeError {}

#[derive(Debug, Clone)]
pub struct TreeNode {
    display_name: CompactString,
    path: PathBuf,
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Option<Vec<NodeId>>,
    draft: Option<DraftMode>,
}

impl TreeNode {
    fn new(
        display_name: CompactString,
        path: PathBuf,
        kind: NodeKind,
        parent: Option<NodeId>,
    ) -> Self {
        Self {
            display_name,
            path,
            kind,
            parent,
            children: None,
            draft: None,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// `false` means "not yet loaded"; a loaded empty directory is `true`.
    pub fn is_loaded(&self) -> bool {
        self.children.is_some()
    }

    pub fn is_draft(&self) -> bool {
        self.draft.is_some()
    }

    pub fn draft_mode(&self) -> Option<DraftMode> {
        self.draft
    }

    fn is_pending_add(&self) -> bool {
        self.draft == Some(DraftMode::Add)
    }

    fn is_listed(&self) -> bool {
        self.draft.is_some() || !is_hidden(&self.display_name)
    }
}

/// One directory entry as reported by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry {
    pub name: CompactString,
    pub path: PathBuf,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub added: usize,
    pub kept: usize,
    pub removed: usize,
}

#[derive(Debug, Clone)]
pub struct TreeRow {
    pub id: NodeId,
    pub depth: u16,
    pub name: CompactString,
    pub kind: NodeKind,
    pub is_expanded: bool,
    pub is_draft: bool,
    pub is_loaded: bool,
}

pub struct NoteTree {
    arena: SlotMap<NodeId, TreeNode>,
    root: NodeId,
    by_path: FxHashMap<PathBuf, NodeId>,
    expanded: FxHashSet<PathBuf>,
}

impl fmt::Debug for NoteTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoteTree")
            .field("root", &self.root_path())
            .field("nodes", &self.arena.len())
            .field("expanded", &self.expanded.len())
            .finish()
    }
}

impl NoteTree {
    pub fn new(root_path: PathBuf) -> Self {
        let mut arena = SlotMap::with_key();
        let name = CompactString::from(note_path::file_name_lossy(&root_path));
        let root = arena.insert(TreeNode::new(
            name,
            root_path.clone(),
            NodeKind::Directory,
            None,
        ));

        let mut by_path = FxHashMap::default();
        by_path.insert(root_path, root);

        Self {
            arena,
            root,
            by_path,
            expanded: FxHashSet::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_path(&self) -> &Path {
        &self.arena[self.root].path
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() <= 1
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.arena.get(id)
    }

    pub fn find_by_path(&self, path: &Path) -> Option<NodeId> {
        self.by_path.get(path).copied()
    }

    pub fn get_by_path(&self, path: &Path) -> Option<&TreeNode> {
        self.find_by_path(path).and_then(|id| self.arena.get(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains_key(id)
    }

    pub fn is_expanded(&self, path: &Path) -> bool {
        path == self.root_path() || self.expanded.contains(path)
    }

    pub fn expanded_paths(&self) -> impl Iterator<Item = &Path> {
        self.expanded.iter().map(PathBuf::as_path)
    }

    /// Ordered, hidden-filtered children; `None` while not yet loaded.
    pub fn children(&self, id: NodeId) -> Option<Vec<NodeId>> {
        let raw = self.arena.get(id)?.children.as_ref()?;
        let mut listed: Vec<NodeId> = raw
            .iter()
            .copied()
            .filter(|child| self.arena.get(*child).is_some_and(TreeNode::is_listed))
            .collect();
        listed.sort_by(|a, b| self.sibling_order(*a, *b));
        Some(listed)
    }

    pub fn child_listing(&self, path: &Path) -> Option<Vec<&TreeNode>> {
        let id = self.find_by_path(path)?;
        let children = self.children(id)?;
        Some(children.into_iter().map(|c| &self.arena[c]).collect())
    }

    fn sibling_order(&self, a: NodeId, b: NodeId) -> Ordering {
        let a = &self.arena[a];
        let b = &self.arena[b];
        a.kind
            .rank()
            .cmp(&b.kind.rank())
            .then_with(|| a.is_pending_add().cmp(&b.is_pending_add()))
            .then_with(|| a.display_name.cmp(&b.display_name))
            .then_with(|| a.path.cmp(&b.path))
    }

    /// Parent chain of `id`, nearest first, root included.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.arena.get(id).and_then(|n| n.parent);
        while let Some(parent) = current {
            out.push(parent);
            current = self.arena.get(parent).and_then(|n| n.parent);
        }
        out
    }

    pub fn insert_child(
        &mut self,
        parent: NodeId,
        name: CompactString,
        path: PathBuf,
        kind: NodeKind,
        draft: Option<DraftMode>,
    ) -> Result<NodeId, NoteTreeError> {
        {
            let parent_ro = self.arena.get(parent).ok_or(NoteTreeError::InvalidNodeId)?;
            if parent_ro.kind != NodeKind::Directory {
                return Err(NoteTreeError::ParentNotDirectory);
            }
            if parent_ro.children.is_none() {
                return Err(NoteTreeError::ParentNotLoaded);
            }
            if self.by_path.contains_key(&path) {
                return Err(NoteTreeError::PathExists(path));
            }
        }

        let mut node = TreeNode::new(name, path.clone(), kind, Some(parent));
        node.draft = draft;
        let id = self.arena.insert(node);
        self.by_path.insert(path, id);

        self.arena
            .get_mut(parent)
            .and_then(|n| n.children.as_mut())
            .ok_or(NoteTreeError::ParentNotLoaded)?
            .push(id);

        Ok(id)
    }

    /// First load of an unloaded directory. Returns the number of entries
    /// materialized.
    pub fn install_children<I>(&mut self, id: NodeId, entries: I) -> Result<usize, NoteTreeError>
    where
        I: IntoIterator<Item = ChildEntry>,
    {
        {
            let node = self.arena.get_mut(id).ok_or(NoteTreeError::InvalidNodeId)?;
            if node.kind != NodeKind::Directory {
                return Err(NoteTreeError::ParentNotDirectory);
            }
            if node.children.is_some() {
                return Err(NoteTreeError::Inconsistent(format!(
                    "{} is already loaded",
                    node.path.display()
                )));
            }
            node.children = Some(Vec::new());
        }
        let dir_path = self.arena[id].path.clone();

        let mut installed = 0;
        for entry in entries {
            if entry.path.parent() != Some(dir_path.as_path()) || self.by_path.contains_key(&entry.path) {
                continue;
            }
            self.insert_child(id, entry.name, entry.path, entry.kind, None)?;
            installed += 1;
        }
        Ok(installed)
    }

    /// Reconciles a directory's children with a fresh listing.
    ///
    /// Children whose path and kind are unchanged keep their node (and any
    /// loaded subtree). Vanished children are removed along with their
    /// expansion entries. Add-draft placeholders survive; one whose
    /// provisional path is now taken by a real entry is moved aside.
    pub fn merge_children<I>(&mut self, id: NodeId, entries: I) -> Result<MergeReport, NoteTreeError>
    where
        I: IntoIterator<Item = ChildEntry>,
    {
        let existing = {
            let node = self.arena.get_mut(id).ok_or(NoteTreeError::InvalidNodeId)?;
            if node.kind != NodeKind::Directory {
                return Err(NoteTreeError::ParentNotDirectory);
            }
            node.children.take().unwrap_or_default()
        };
        let dir_path = self.arena[id].path.clone();

        let mut report = MergeReport::default();
        let mut next: Vec<NodeId> = Vec::with_capacity(existing.len());
        let mut placeholders: Vec<NodeId> = Vec::new();
        let mut stale: FxHashMap<PathBuf, NodeId> = FxHashMap::default();
        for child in existing {
            match self.arena.get(child) {
                Some(node) if node.is_pending_add() => placeholders.push(child),
                Some(node) => {
                    stale.insert(node.path.clone(), child);
                }
                None => {}
            }
        }

        let mut seen: FxHashSet<PathBuf> = FxHashSet::default();
        let mut fresh: Vec<ChildEntry> = Vec::new();
        for entry in entries {
            if entry.path.parent() != Some(dir_path.as_path()) || !seen.insert(entry.path.clone()) {
                continue;
            }
            match stale.remove(&entry.path) {
                Some(child) if self.arena[child].kind == entry.kind => {
                    next.push(child);
                    report.kept += 1;
                }
                Some(child) => {
                    self.remove_detached(child);
                    report.removed += 1;
                    fresh.push(entry);
                }
                None => fresh.push(entry),
            }
        }

        for (_, child) in stale {
            self.remove_detached(child);
            report.removed += 1;
        }

        for placeholder in &placeholders {
            let taken = self
                .arena
                .get(*placeholder)
                .is_some_and(|n| seen.contains(&n.path));
            if taken {
                self.relocate_placeholder(*placeholder, &seen);
            }
        }
        next.extend(placeholders);

        self.arena[id].children = Some(next);

        for entry in fresh {
            self.insert_child(id, entry.name, entry.path, entry.kind, None)?;
            report.added += 1;
        }

        Ok(report)
    }

    /// Moves the Add placeholder `id` off `reserved` to the next free
    /// sibling path, keeping its display name. Returns the new path, or
    /// `None` when `id` is not an Add placeholder.
    pub fn move_placeholder_aside(&mut self, id: NodeId, reserved: &Path) -> Option<PathBuf> {
        if !self.arena.get(id).is_some_and(TreeNode::is_pending_add) {
            return None;
        }
        let mut taken = FxHashSet::default();
        taken.insert(reserved.to_path_buf());
        Some(self.relocate_placeholder(id, &taken))
    }

    fn relocate_placeholder(&mut self, id: NodeId, taken: &FxHashSet<PathBuf>) -> PathBuf {
        let node = &self.arena[id];
        let path = node.path.clone();
        let stem = node.display_name.clone();
        let Some(dir) = path.parent().map(Path::to_path_buf) else {
            return path;
        };
        let extension = path.extension().map(|e| e.to_string_lossy().into_owned());
        let moved = self.vacant_child_path_excluding(&dir, &stem, extension.as_deref(), taken);
        if self.by_path.get(&path) == Some(&id) {
            self.by_path.remove(&path);
        }
        self.by_path.insert(moved.clone(), id);
        self.arena[id].path = moved.clone();
        moved
    }

    /// Removes the subtree rooted at `id` and prunes expansion entries at or
    /// below its path. Returns the number of nodes removed.
    pub fn remove(&mut self, id: NodeId) -> Result<usize, NoteTreeError> {
        if id == self.root {
            return Err(NoteTreeError::RootImmutable);
        }
        let parent = self
            .arena
            .get(id)
            .ok_or(NoteTreeError::InvalidNodeId)?
            .parent;

        if let Some(children) = parent
            .and_then(|p| self.arena.get_mut(p))
            .and_then(|n| n.children.as_mut())
        {
            children.retain(|c| *c != id);
        }

        Ok(self.remove_detached(id))
    }

    fn remove_detached(&mut self, id: NodeId) -> usize {
        let Some(top) = self.arena.get(id).map(|n| n.path.clone()) else {
            return 0;
        };

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(node_id) = stack.pop() {
            if let Some(node) = self.arena.remove(node_id) {
                if self.by_path.get(&node.path) == Some(&node_id) {
                    self.by_path.remove(&node.path);
                }
                if let Some(children) = node.children {
                    stack.extend(children);
                }
                removed += 1;
            }
        }

        self.expanded
            .retain(|p| !note_path::is_same_or_within(p, &top));
        removed
    }

    /// Moves the subtree at `id` to the sibling path `new_path`, rewriting
    /// every descendant path and the expansion entries beneath it.
    pub fn rebase(&mut self, id: NodeId, new_path: PathBuf) -> Result<(), NoteTreeError> {
        if id == self.root {
            return Err(NoteTreeError::RootImmutable);
        }
        let old_path = self
            .arena
            .get(id)
            .ok_or(NoteTreeError::InvalidNodeId)?
            .path
            .clone();
        if old_path == new_path {
            return Ok(());
        }
        if old_path.parent() != new_path.parent() {
            return Err(NoteTreeError::NotSibling);
        }
        if self.by_path.contains_key(&new_path) {
            return Err(NoteTreeError::PathExists(new_path));
        }

        let mut stack = vec![id];
        while let Some(node_id) = stack.pop() {
            let Some(node) = self.arena.get_mut(node_id) else {
                continue;
            };
            let Some(rebased) = note_path::rebase(&node.path, &old_path, &new_path) else {
                continue;
            };
            let previous = std::mem::replace(&mut node.path, rebased.clone());
            if let Some(children) = &node.children {
                stack.extend(children.iter().copied());
            }
            if self.by_path.get(&previous) == Some(&node_id) {
                self.by_path.remove(&previous);
            }
            self.by_path.insert(rebased, node_id);
        }

        self.arena[id].display_name = CompactString::from(note_path::file_name_lossy(&new_path));

        let moved: Vec<PathBuf> = self
            .expanded
            .iter()
            .filter(|p| note_path::is_same_or_within(p, &old_path))
            .cloned()
            .collect();
        for path in moved {
            self.expanded.remove(&path);
            if let Some(rebased) = note_path::rebase(&path, &old_path, &new_path) {
                self.expanded.insert(rebased);
            }
        }

        Ok(())
    }

    /// Returns whether membership changed. Only directory nodes can be
    /// expanded; the root is always expanded and never stored.
    pub fn set_expanded(&mut self, path: &Path, expanded: bool) -> bool {
        if path == self.root_path() {
            return false;
        }
        if !self.get_by_path(path).is_some_and(TreeNode::is_dir) {
            return false;
        }
        if expanded {
            self.expanded.insert(path.to_path_buf())
        } else {
            self.expanded.remove(path)
        }
    }

    /// Flips membership and returns the new state.
    pub fn toggle_expanded(&mut self, path: &Path) -> Option<bool> {
        if !self.get_by_path(path).is_some_and(TreeNode::is_dir) {
            return None;
        }
        let next = !self.is_expanded(path);
        self.set_expanded(path, next);
        Some(self.is_expanded(path))
    }

    pub fn set_draft(&mut self, id: NodeId, draft: Option<DraftMode>) -> bool {
        match self.arena.get_mut(id) {
            Some(node) if node.draft != draft => {
                node.draft = draft;
                true
            }
            _ => false,
        }
    }

    /// First free `<dir>/<stem>[ N][.ext]` path.
    pub fn vacant_child_path(&self, dir: &Path, stem: &str, extension: Option<&str>) -> PathBuf {
        self.vacant_child_path_excluding(dir, stem, extension, &FxHashSet::default())
    }

    fn vacant_child_path_excluding(
        &self,
        dir: &Path,
        stem: &str,
        extension: Option<&str>,
        taken: &FxHashSet<PathBuf>,
    ) -> PathBuf {
        let compose = |n: usize| {
            let base = if n <= 1 {
                stem.to_string()
            } else {
                format!("{stem} {n}")
            };
            match extension {
                Some(ext) => dir.join(note_path::note_file_name(&base, ext)),
                None => dir.join(base),
            }
        };

        let mut n = 1;
        loop {
            let candidate = compose(n);
            if !self.by_path.contains_key(&candidate) && !taken.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Visible rows in render order; the root itself is not a row.
    pub fn flatten_for_view(&self) -> Vec<TreeRow> {
        let mut result = Vec::new();
        let mut stack: Vec<(NodeId, u16)> = vec![(self.root, 0)];

        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.arena.get(id) else {
                continue;
            };
            let expanded = self.is_expanded(&node.path);
            if id != self.root {
                result.push(TreeRow {
                    id,
                    depth,
                    name: node.display_name.clone(),
                    kind: node.kind,
                    is_expanded: node.is_dir() && expanded,
                    is_draft: node.is_draft(),
                    is_loaded: node.is_loaded(),
                });
            }

            if expanded {
                if let Some(children) = self.children(id) {
                    let child_depth = if id == self.root { 0 } else { depth + 1 };
                    for child in children.into_iter().rev() {
                        stack.push((child, child_depth));
                    }
                }
            }
        }

        result
    }

    /// Checks path uniqueness, index/arena agreement, parent links, that every
    /// expanded path is a directory node, and that at most one node is a draft.
    pub fn validate(&self) -> Result<(), NoteTreeError> {
        if self.by_path.len() != self.arena.len() {
            return Err(NoteTreeError::Inconsistent(format!(
                "{} indexed paths for {} nodes",
                self.by_path.len(),
                self.arena.len()
            )));
        }

        for (path, id) in &self.by_path {
            let node = self.arena.get(*id).ok_or_else(|| {
                NoteTreeError::Inconsistent(format!("dangling index {}", path.display()))
            })?;
            if &node.path != path {
                return Err(NoteTreeError::Inconsistent(format!(
                    "index {} points at {}",
                    path.display(),
                    node.path.display()
                )));
            }
        }

        let mut drafts = 0;
        for (id, node) in &self.arena {
            if node.draft.is_some() {
                drafts += 1;
            }
            if let Some(parent) = node.parent {
                let linked = self
                    .arena
                    .get(parent)
                    .and_then(|p| p.children.as_ref())
                    .is_some_and(|c| c.contains(&id));
                if !linked {
                    return Err(NoteTreeError::Inconsistent(format!(
                        "{} missing from its parent",
                        node.path.display()
                    )));
                }
            }
            for child in node.children.iter().flatten() {
                if self.arena.get(*child).and_then(|c| c.parent) != Some(id) {
                    return Err(NoteTreeError::Inconsistent(format!(
                        "bad parent link under {}",
                        node.path.display()
                    )));
                }
            }
        }
        if drafts > 1 {
            return Err(NoteTreeError::Inconsistent(format!("{drafts} drafts")));
        }

        for path in &self.expanded {
            if !self.get_by_path(path).is_some_and(TreeNode::is_dir) {
                return Err(NoteTreeError::Inconsistent(format!(
                    "expanded path {} is not a directory node",
                    path.display()
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/note_tree.rs"]
mod tests;
