use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

use super::effect::RequestId;
use super::error::TreeError;
use super::services::ports::NavigatorConfig;
use crate::models::{DraftMode, NodeId, NodeKind, NoteTree};

/// A gateway call that has been issued and not yet completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingOp {
    Read {
        path: PathBuf,
        /// Expand the directory once the listing lands.
        expand: bool,
    },
    Create {
        parent: PathBuf,
        path: PathBuf,
        kind: NodeKind,
    },
    Rename {
        node: NodeId,
        from: PathBuf,
        to: PathBuf,
    },
    Delete {
        path: PathBuf,
    },
}

impl PendingOp {
    pub fn path(&self) -> &Path {
        match self {
            PendingOp::Read { path, .. }
            | PendingOp::Create { path, .. }
            | PendingOp::Delete { path } => path,
            PendingOp::Rename { from, .. } => from,
        }
    }
}

/// The single in-progress inline edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSession {
    pub mode: DraftMode,
    pub kind: NodeKind,
    /// Add: the directory receiving the entry. Rename: the node being renamed.
    pub anchor_path: PathBuf,
    pub provisional_path: PathBuf,
    /// `None` while an Add waits for its directory listing.
    pub node: Option<NodeId>,
    pub pending: Option<RequestId>,
    pub error: Option<TreeError>,
}

impl DraftSession {
    pub fn is_committing(&self) -> bool {
        self.pending.is_some()
    }
}

#[derive(Debug)]
pub struct NavigatorState {
    pub tree: NoteTree,
    pub config: NavigatorConfig,
    pub draft: Option<DraftSession>,
    pub last_error: Option<TreeError>,
    pub(crate) pending: FxHashMap<RequestId, PendingOp>,
    /// Newest read issued per directory; older completions are dropped.
    pub(crate) latest_read: FxHashMap<PathBuf, RequestId>,
    pub(crate) next_request: u64,
}

impl NavigatorState {
    pub fn new(root: PathBuf, config: NavigatorConfig) -> Self {
        Self {
            tree: NoteTree::new(root),
            config,
            draft: None,
            last_error: None,
            pending: FxHashMap::default(),
            latest_read: FxHashMap::default(),
            next_request: 0,
        }
    }

    pub fn workspace_root(&self) -> &Path {
        self.tree.root_path()
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    pub fn is_loading(&self, path: &Path) -> bool {
        self.latest_read
            .get(path)
            .is_some_and(|request| self.pending.contains_key(request))
    }
}
