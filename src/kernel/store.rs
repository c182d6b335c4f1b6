use std::path::{Path, PathBuf};

use compact_str::CompactString;
use tracing::{debug, warn};

use super::error::{tree_error_at, TreeError};
use super::state::{DraftSession, NavigatorState, PendingOp};
use super::{Action, Effect, RequestId};
use crate::models::{DraftMode, NodeId, NodeKind};

mod reducers;

#[derive(Debug, Default)]
pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
    pub error: Option<TreeError>,
}

impl DispatchResult {
    pub(crate) fn unchanged() -> Self {
        Self::default()
    }

    pub(crate) fn changed(state_changed: bool) -> Self {
        Self {
            state_changed,
            ..Self::default()
        }
    }

    pub(crate) fn with_effects(effects: Vec<Effect>, state_changed: bool) -> Self {
        Self {
            effects,
            state_changed,
            error: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub struct Store {
    state: NavigatorState,
}

impl Store {
    pub fn new(state: NavigatorState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &NavigatorState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::OpenWorkspace { .. }
            | Action::Expand { .. }
            | Action::Refresh { .. }
            | Action::CreateNote { .. }
            | Action::CreateFolder { .. }
            | Action::Rename { .. }
            | Action::DeleteRecursive { .. }
            | Action::Activate { .. } => self.reduce_navigator_action(action),
            Action::BeginAdd { .. }
            | Action::BeginRename { .. }
            | Action::CommitDraft { .. }
            | Action::CancelDraft => self.reduce_draft_action(action),
            Action::RunCommand { .. } => self.reduce_context_menu_action(action),
            Action::DirectoryRead { .. }
            | Action::PathCreated { .. }
            | Action::PathRenamed { .. }
            | Action::PathDeleted { .. }
            | Action::GatewayFailed { .. } => self.reduce_completion(action),
        }
    }

    fn register(&mut self, op: PendingOp) -> RequestId {
        self.state.next_request += 1;
        let request = RequestId(self.state.next_request);
        debug!(%request, path = %op.path().display(), "gateway request issued");
        self.state.pending.insert(request, op);
        request
    }

    /// Issues a directory read; any read still in flight for the same path
    /// becomes stale and hands its expand request over to the new one.
    fn issue_read(&mut self, path: PathBuf, expand: bool) -> Effect {
        let inherited = self
            .state
            .latest_read
            .get(&path)
            .and_then(|request| self.state.pending.get(request))
            .is_some_and(|op| matches!(op, PendingOp::Read { expand: true, .. }));
        let expand = expand || inherited;
        let request = self.register(PendingOp::Read {
            path: path.clone(),
            expand,
        });
        self.state.latest_read.insert(path.clone(), request);
        Effect::ReadDirectory { request, path }
    }

    /// Reuses an in-flight read for `path` when there is one.
    fn ensure_read(&mut self, path: PathBuf, expand: bool) -> Option<Effect> {
        if let Some(request) = self.state.latest_read.get(&path).copied() {
            if let Some(PendingOp::Read { expand: pending, .. }) =
                self.state.pending.get_mut(&request)
            {
                *pending |= expand;
                return None;
            }
        }
        Some(self.issue_read(path, expand))
    }

    fn fail(&mut self, error: TreeError) -> DispatchResult {
        if error.is_user_visible() {
            self.state.last_error = Some(error.clone());
        }
        DispatchResult {
            effects: Vec::new(),
            state_changed: false,
            error: Some(error),
        }
    }

    fn node_at(&self, path: &Path) -> Result<NodeId, TreeError> {
        self.state
            .tree
            .find_by_path(path)
            .ok_or_else(|| TreeError::NotFound(path.to_path_buf()))
    }

    fn directory_at(&self, path: &Path) -> Result<NodeId, TreeError> {
        let id = self.node_at(path)?;
        match self.state.tree.node(id) {
            Some(node) if node.is_dir() => Ok(id),
            _ => Err(TreeError::NotADirectory(path.to_path_buf())),
        }
    }

    /// Inserts the Add placeholder under `dir` at the first free
    /// `New note[ N].md` / `New folder[ N]` path and expands `dir`.
    fn insert_placeholder(&mut self, dir: NodeId, draft: &mut DraftSession) -> Result<(), TreeError> {
        let dir_path = self
            .state
            .tree
            .node(dir)
            .map(|n| n.path().to_path_buf())
            .ok_or_else(|| TreeError::NotFound(draft.anchor_path.clone()))?;
        let (label, extension) = match draft.kind {
            NodeKind::Note => (
                self.state.config.new_note_label.clone(),
                Some(self.state.config.note_extension().to_string()),
            ),
            NodeKind::Directory => (self.state.config.new_folder_label.clone(), None),
        };
        let path = self
            .state
            .tree
            .vacant_child_path(&dir_path, &label, extension.as_deref());
        let id = self
            .state
            .tree
            .insert_child(
                dir,
                CompactString::from(label),
                path.clone(),
                draft.kind,
                Some(DraftMode::Add),
            )
            .map_err(|err| tree_error_at(dir_path.clone(), err))?;
        self.state.tree.set_expanded(&dir_path, true);
        draft.anchor_path = dir_path;
        draft.provisional_path = path;
        draft.node = Some(id);
        Ok(())
    }

    /// Re-derives the draft's paths from the tree after a structural change.
    /// A draft whose node (or anchor directory) disappeared is dropped.
    fn sync_draft(&mut self) -> bool {
        let Some(mut draft) = self.state.draft.take() else {
            return false;
        };
        let before = draft.clone();

        match draft.node {
            Some(id) => {
                let Some(node) = self.state.tree.node(id) else {
                    debug!(path = %draft.provisional_path.display(), "draft node vanished");
                    return true;
                };
                draft.provisional_path = node.path().to_path_buf();
                draft.anchor_path = match draft.mode {
                    DraftMode::Add => node
                        .parent()
                        .and_then(|p| self.state.tree.node(p))
                        .map(|p| p.path().to_path_buf())
                        .unwrap_or_else(|| draft.anchor_path.clone()),
                    DraftMode::Rename => node.path().to_path_buf(),
                };
            }
            None => {
                let Some(dir) = self.state.tree.find_by_path(&draft.anchor_path) else {
                    debug!(path = %draft.anchor_path.display(), "draft anchor vanished");
                    return true;
                };
                if self.state.tree.node(dir).is_some_and(|n| n.is_loaded()) {
                    if let Err(err) = self.insert_placeholder(dir, &mut draft) {
                        warn!(error = %err, "failed to place draft");
                        draft.error = Some(err);
                    }
                }
            }
        }

        let changed = draft != before;
        self.state.draft = Some(draft);
        changed
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
