use std::path::{Path, PathBuf};

use tracing::info;

use crate::kernel::error::TreeError;
use crate::kernel::state::PendingOp;
use crate::kernel::store::{DispatchResult, Store};
use crate::kernel::{Action, Effect, RequestId};
use crate::models::note_path::sibling_path;
use crate::models::{note_file_name, validate_entry_name, DraftMode, NodeKind, NoteTree};

impl Store {
    pub(crate) fn reduce_navigator_action(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::OpenWorkspace { root } => {
                info!(root = %root.display(), "opening workspace");
                self.state.tree = NoteTree::new(root.clone());
                self.state.draft = None;
                self.state.last_error = None;
                self.state.pending.clear();
                self.state.latest_read.clear();
                let effect = self.issue_read(root, false);
                DispatchResult::with_effects(vec![effect], true)
            }
            Action::Expand { path } => self.expand(path),
            Action::Refresh { path } => match self.directory_at(&path) {
                Ok(_) => {
                    let effect = self.issue_read(path, false);
                    DispatchResult::with_effects(vec![effect], false)
                }
                Err(err) => self.fail(err),
            },
            Action::CreateNote { parent, name } => {
                match self.request_create(&parent, &name, NodeKind::Note) {
                    Ok((_, effect)) => DispatchResult::with_effects(vec![effect], false),
                    Err(err) => self.fail(err),
                }
            }
            Action::CreateFolder { parent, name } => {
                match self.request_create(&parent, &name, NodeKind::Directory) {
                    Ok((_, effect)) => DispatchResult::with_effects(vec![effect], false),
                    Err(err) => self.fail(err),
                }
            }
            Action::Rename { path, new_name } => match self.request_rename(&path, &new_name) {
                Ok(Some((_, effect))) => DispatchResult::with_effects(vec![effect], false),
                Ok(None) => DispatchResult::unchanged(),
                Err(err) => self.fail(err),
            },
            Action::DeleteRecursive { path } => match self.request_delete(path) {
                Ok(effect) => DispatchResult::with_effects(vec![effect], false),
                Err(err) => self.fail(err),
            },
            Action::Activate { path } => {
                let Some(node) = self.state.tree.get_by_path(&path) else {
                    return self.fail(TreeError::NotFound(path));
                };
                if node.is_draft() {
                    return DispatchResult::unchanged();
                }
                match node.kind() {
                    NodeKind::Note => DispatchResult::with_effects(vec![Effect::OpenNote(path)], false),
                    NodeKind::Directory => self.expand(path),
                }
            }
            _ => DispatchResult::unchanged(),
        }
    }

    /// Toggles a loaded directory; an unloaded one is read first and expanded
    /// when the listing lands.
    fn expand(&mut self, path: PathBuf) -> DispatchResult {
        let id = match self.node_at(&path) {
            Ok(id) => id,
            Err(err) => return self.fail(err),
        };
        let Some(node) = self.state.tree.node(id) else {
            return DispatchResult::unchanged();
        };
        // An Add placeholder has nothing on disk to list yet.
        if !node.is_dir() || node.draft_mode() == Some(DraftMode::Add) {
            return DispatchResult::unchanged();
        }
        if node.is_loaded() {
            let before = self.state.tree.is_expanded(&path);
            let after = self.state.tree.toggle_expanded(&path).unwrap_or(before);
            return DispatchResult::changed(before != after);
        }
        match self.ensure_read(path, true) {
            Some(effect) => DispatchResult::with_effects(vec![effect], false),
            None => DispatchResult::unchanged(),
        }
    }

    pub(crate) fn request_create(
        &mut self,
        parent: &Path,
        name: &str,
        kind: NodeKind,
    ) -> Result<(RequestId, Effect), TreeError> {
        let name = validate_entry_name(name)?;
        self.directory_at(parent)?;
        let parent = parent.to_path_buf();

        match kind {
            NodeKind::Note => {
                let file_name = note_file_name(name, self.state.config.note_extension());
                let request = self.register(PendingOp::Create {
                    parent: parent.clone(),
                    path: parent.join(&file_name),
                    kind,
                });
                let content = self.state.config.initial_note_content.clone();
                Ok((
                    request,
                    Effect::CreateFile {
                        request,
                        dir: parent,
                        name: file_name,
                        content,
                    },
                ))
            }
            NodeKind::Directory => {
                let path = parent.join(name);
                let request = self.register(PendingOp::Create {
                    parent,
                    path: path.clone(),
                    kind,
                });
                Ok((request, Effect::CreateFolder { request, path }))
            }
        }
    }

    /// `Ok(None)` when the new name resolves to the current path.
    pub(crate) fn request_rename(
        &mut self,
        path: &Path,
        new_name: &str,
    ) -> Result<Option<(RequestId, Effect)>, TreeError> {
        let new_name = validate_entry_name(new_name)?;
        let id = self.node_at(path)?;
        if id == self.state.tree.root() {
            return Err(TreeError::RootImmutable);
        }
        let kind = self
            .state
            .tree
            .node(id)
            .map(|n| n.kind())
            .ok_or_else(|| TreeError::NotFound(path.to_path_buf()))?;

        let file_name = match kind {
            NodeKind::Note => note_file_name(new_name, self.state.config.note_extension()),
            NodeKind::Directory => new_name.to_string(),
        };
        let to = sibling_path(path, &file_name);
        if to == path {
            return Ok(None);
        }

        let from = path.to_path_buf();
        let request = self.register(PendingOp::Rename {
            node: id,
            from: from.clone(),
            to: to.clone(),
        });
        Ok(Some((request, Effect::Rename { request, from, to })))
    }

    fn request_delete(&mut self, path: PathBuf) -> Result<Effect, TreeError> {
        let id = self.node_at(&path)?;
        if id == self.state.tree.root() {
            return Err(TreeError::RootImmutable);
        }
        let request = self.register(PendingOp::Delete { path: path.clone() });
        Ok(Effect::DeleteRecursive { request, path })
    }
}
