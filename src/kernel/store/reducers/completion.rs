//! 网关回调：按请求号匹配挂起操作，丢弃过期结果

use std::path::PathBuf;

use compact_str::CompactString;
use tracing::{debug, info, warn};

use crate::kernel::error::{tree_error_at, TreeError};
use crate::kernel::services::ports::{EntryKind, StorageEntry};
use crate::kernel::state::PendingOp;
use crate::kernel::store::{DispatchResult, Store};
use crate::kernel::{Action, RequestId};
use crate::models::note_path::file_name_lossy;
use crate::models::{ChildEntry, NodeId, NodeKind};

impl From<EntryKind> for NodeKind {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::File => NodeKind::Note,
            EntryKind::Directory => NodeKind::Directory,
        }
    }
}

impl From<StorageEntry> for ChildEntry {
    fn from(entry: StorageEntry) -> Self {
        ChildEntry {
            name: CompactString::from(entry.name),
            path: entry.path,
            kind: entry.kind.into(),
        }
    }
}

impl Store {
    pub(crate) fn reduce_completion(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::DirectoryRead { request, entries } => {
                let Some(PendingOp::Read { path, expand }) = self.take_pending(request) else {
                    return DispatchResult::unchanged();
                };
                self.apply_directory_read(request, path, expand, entries)
            }
            Action::PathCreated { request, path } => {
                let Some(PendingOp::Create { parent, kind, .. }) = self.take_pending(request) else {
                    return DispatchResult::unchanged();
                };
                self.apply_created(request, parent, path, kind)
            }
            Action::PathRenamed { request } => {
                let Some(PendingOp::Rename { node, from, to }) = self.take_pending(request) else {
                    return DispatchResult::unchanged();
                };
                self.apply_renamed(request, node, from, to)
            }
            Action::PathDeleted { request } => {
                let Some(PendingOp::Delete { path }) = self.take_pending(request) else {
                    return DispatchResult::unchanged();
                };
                let Some(id) = self.state.tree.find_by_path(&path) else {
                    debug!(%request, path = %path.display(), "deleted path already gone");
                    return DispatchResult::unchanged();
                };
                match self.state.tree.remove(id) {
                    Ok(removed) => info!(path = %path.display(), removed, "deleted"),
                    Err(err) => return self.fail(tree_error_at(path, err)),
                }
                self.sync_draft();
                DispatchResult::changed(true)
            }
            Action::GatewayFailed { request, error } => {
                let Some(op) = self.take_pending(request) else {
                    return DispatchResult::unchanged();
                };
                let err = TreeError::from(error);
                warn!(%request, path = %op.path().display(), error = %err, "gateway call failed");

                if let PendingOp::Read { path, .. } = &op {
                    if self.state.latest_read.get(path) == Some(&request) {
                        self.state.latest_read.remove(path);
                    }
                }
                if let Some(draft) = self.state.draft.as_mut() {
                    let awaiting_listing = draft.node.is_none()
                        && matches!(&op, PendingOp::Read { path, .. } if *path == draft.anchor_path);
                    if draft.pending == Some(request) || awaiting_listing {
                        draft.pending = None;
                        draft.error = Some(err.clone());
                    }
                }

                let mut result = self.fail(err);
                result.state_changed = true;
                result
            }
            _ => DispatchResult::unchanged(),
        }
    }

    fn take_pending(&mut self, request: RequestId) -> Option<PendingOp> {
        let op = self.state.pending.remove(&request);
        if op.is_none() {
            debug!(%request, "dropping completion for unknown request");
        }
        op
    }

    fn apply_directory_read(
        &mut self,
        request: RequestId,
        path: PathBuf,
        expand: bool,
        entries: Vec<StorageEntry>,
    ) -> DispatchResult {
        if self.state.latest_read.get(&path) != Some(&request) {
            debug!(%request, path = %path.display(), "dropping superseded directory read");
            return DispatchResult::unchanged();
        }
        self.state.latest_read.remove(&path);

        let Some(id) = self.state.tree.find_by_path(&path) else {
            debug!(%request, path = %path.display(), "directory no longer in tree");
            return DispatchResult::unchanged();
        };
        let loaded = match self.state.tree.node(id) {
            Some(node) if node.is_dir() => node.is_loaded(),
            _ => {
                debug!(%request, path = %path.display(), "read target is not a directory");
                return DispatchResult::unchanged();
            }
        };

        let entries = entries.into_iter().map(ChildEntry::from);
        let applied = if loaded {
            self.state
                .tree
                .merge_children(id, entries)
                .map(|report| {
                    debug!(
                        path = %path.display(),
                        added = report.added,
                        kept = report.kept,
                        removed = report.removed,
                        "directory refreshed"
                    )
                })
        } else {
            self.state
                .tree
                .install_children(id, entries)
                .map(|count| debug!(path = %path.display(), count, "directory loaded"))
        };
        if let Err(err) = applied {
            return self.fail(tree_error_at(path, err));
        }

        if expand {
            self.state.tree.set_expanded(&path, true);
        }
        self.sync_draft();
        DispatchResult::changed(true)
    }

    fn apply_created(
        &mut self,
        request: RequestId,
        parent: PathBuf,
        path: PathBuf,
        kind: NodeKind,
    ) -> DispatchResult {
        info!(path = %path.display(), ?kind, "created");

        let committed_draft = self
            .state
            .draft
            .as_ref()
            .is_some_and(|d| d.pending == Some(request));
        if committed_draft {
            if let Some(placeholder) = self.state.draft.take().and_then(|d| d.node) {
                if self.state.tree.contains(placeholder) {
                    let _ = self.state.tree.remove(placeholder);
                }
            }
        }

        let Some(parent_id) = self.state.tree.find_by_path(&parent) else {
            debug!(%request, path = %parent.display(), "parent of created entry is gone");
            return DispatchResult::changed(committed_draft);
        };
        let parent_loaded = self
            .state
            .tree
            .node(parent_id)
            .is_some_and(|n| n.is_loaded());
        if parent_loaded && self.state.tree.find_by_path(&path).is_none() {
            let name = CompactString::from(file_name_lossy(&path));
            if let Err(err) = self
                .state
                .tree
                .insert_child(parent_id, name, path.clone(), kind, None)
            {
                warn!(path = %path.display(), error = %err, "created entry not materialized");
            }
        }

        let effect = self.issue_read(parent, false);
        DispatchResult::with_effects(vec![effect], true)
    }

    fn apply_renamed(
        &mut self,
        request: RequestId,
        node: NodeId,
        from: PathBuf,
        to: PathBuf,
    ) -> DispatchResult {
        let Some(current) = self.state.tree.node(node).map(|n| n.path().to_path_buf()) else {
            debug!(%request, from = %from.display(), "renamed node no longer in tree");
            return DispatchResult::unchanged();
        };
        // An ancestor may have been renamed while this call was in flight.
        let to = match to.file_name() {
            Some(name) => current.with_file_name(name),
            None => to,
        };

        if let Some(occupant) = self.state.tree.find_by_path(&to) {
            if occupant != node {
                if let Some(moved) = self.state.tree.move_placeholder_aside(occupant, &to) {
                    debug!(path = %moved.display(), "moved draft placeholder off rename target");
                } else {
                    debug!(path = %to.display(), "removing stale occupant of rename target");
                    let _ = self.state.tree.remove(occupant);
                }
            }
        }
        if let Err(err) = self.state.tree.rebase(node, to.clone()) {
            return self.fail(tree_error_at(to, err));
        }
        info!(from = %from.display(), to = %to.display(), "renamed");

        let committed_draft = self
            .state
            .draft
            .as_ref()
            .is_some_and(|d| d.pending == Some(request));
        if committed_draft {
            self.state.tree.set_draft(node, None);
            self.state.draft = None;
        } else {
            self.sync_draft();
        }
        DispatchResult::changed(true)
    }
}
