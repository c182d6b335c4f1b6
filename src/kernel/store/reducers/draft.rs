use std::path::PathBuf;

use tracing::{debug, info};

use crate::kernel::error::TreeError;
use crate::kernel::state::DraftSession;
use crate::kernel::store::{DispatchResult, Store};
use crate::kernel::Action;
use crate::models::{DraftMode, NodeKind};

impl Store {
    pub(crate) fn reduce_draft_action(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::BeginAdd { kind, anchor } => self.begin_add(kind, anchor),
            Action::BeginRename { path } => self.begin_rename(path),
            Action::CommitDraft { name } => self.commit_draft(&name),
            Action::CancelDraft => DispatchResult::changed(self.cancel_draft()),
            _ => DispatchResult::unchanged(),
        }
    }

    fn begin_add(&mut self, kind: NodeKind, anchor: PathBuf) -> DispatchResult {
        let cancelled = self.cancel_draft();

        let anchor_id = match self.node_at(&anchor) {
            Ok(id) => id,
            Err(err) => return self.fail_after(cancelled, err),
        };
        let root = self.state.tree.root();
        let dir = match self.state.tree.node(anchor_id) {
            Some(node) if node.is_dir() => anchor_id,
            Some(node) => node.parent().unwrap_or(root),
            None => return self.fail_after(cancelled, TreeError::NotFound(anchor)),
        };
        let Some((dir_path, loaded)) = self
            .state
            .tree
            .node(dir)
            .map(|n| (n.path().to_path_buf(), n.is_loaded()))
        else {
            return self.fail_after(cancelled, TreeError::NotFound(anchor));
        };

        let mut draft = DraftSession {
            mode: DraftMode::Add,
            kind,
            anchor_path: dir_path.clone(),
            provisional_path: dir_path.clone(),
            node: None,
            pending: None,
            error: None,
        };

        if loaded {
            if let Err(err) = self.insert_placeholder(dir, &mut draft) {
                return self.fail_after(cancelled, err);
            }
            debug!(path = %draft.provisional_path.display(), "add draft started");
            self.state.draft = Some(draft);
            return DispatchResult::changed(true);
        }

        debug!(path = %dir_path.display(), "add draft waiting for listing");
        self.state.draft = Some(draft);
        let effects = self.ensure_read(dir_path, true).into_iter().collect();
        DispatchResult::with_effects(effects, true)
    }

    fn begin_rename(&mut self, path: PathBuf) -> DispatchResult {
        let cancelled = self.cancel_draft();

        let id = match self.node_at(&path) {
            Ok(id) => id,
            Err(err) => return self.fail_after(cancelled, err),
        };
        if id == self.state.tree.root() {
            return self.fail_after(cancelled, TreeError::RootImmutable);
        }
        let Some(kind) = self.state.tree.node(id).map(|n| n.kind()) else {
            return self.fail_after(cancelled, TreeError::NotFound(path));
        };

        let ancestors: Vec<PathBuf> = self
            .state
            .tree
            .ancestors(id)
            .into_iter()
            .filter_map(|a| self.state.tree.node(a).map(|n| n.path().to_path_buf()))
            .collect();
        for ancestor in &ancestors {
            self.state.tree.set_expanded(ancestor, true);
        }
        self.state.tree.set_draft(id, Some(DraftMode::Rename));

        debug!(path = %path.display(), "rename draft started");
        self.state.draft = Some(DraftSession {
            mode: DraftMode::Rename,
            kind,
            anchor_path: path.clone(),
            provisional_path: path,
            node: Some(id),
            pending: None,
            error: None,
        });
        DispatchResult::changed(true)
    }

    fn commit_draft(&mut self, name: &str) -> DispatchResult {
        let Some(draft) = self.state.draft.as_ref() else {
            return self.fail(TreeError::NoDraft);
        };
        if draft.is_committing() {
            return self.fail(TreeError::DraftPending);
        }
        let (mode, kind, anchor, node) = (draft.mode, draft.kind, draft.anchor_path.clone(), draft.node);

        let outcome = match mode {
            DraftMode::Add => self
                .request_create(&anchor, name, kind)
                .map(Some),
            DraftMode::Rename => {
                let current = node
                    .and_then(|id| self.state.tree.node(id))
                    .map(|n| n.path().to_path_buf())
                    .unwrap_or(anchor);
                self.request_rename(&current, name)
            }
        };

        match outcome {
            Ok(Some((request, effect))) => {
                if let Some(draft) = self.state.draft.as_mut() {
                    draft.pending = Some(request);
                    draft.error = None;
                }
                DispatchResult::with_effects(vec![effect], true)
            }
            Ok(None) => {
                if let Some(id) = node {
                    self.state.tree.set_draft(id, None);
                }
                self.state.draft = None;
                info!("rename draft committed without changes");
                DispatchResult::changed(true)
            }
            Err(err) => {
                if let Some(draft) = self.state.draft.as_mut() {
                    draft.error = Some(err.clone());
                }
                self.fail_after(true, err)
            }
        }
    }

    /// Ends the current draft. An Add placeholder is removed, a Rename flag is
    /// cleared. A commit still in flight is detached, not aborted.
    pub(crate) fn cancel_draft(&mut self) -> bool {
        let Some(draft) = self.state.draft.take() else {
            return false;
        };
        if let Some(id) = draft.node {
            match draft.mode {
                DraftMode::Add => {
                    let _ = self.state.tree.remove(id);
                }
                DraftMode::Rename => {
                    self.state.tree.set_draft(id, None);
                }
            }
        }
        if let Some(request) = draft.pending {
            debug!(%request, "draft detached from in-flight commit");
        }
        true
    }

    fn fail_after(&mut self, state_changed: bool, err: TreeError) -> DispatchResult {
        let mut result = self.fail(err);
        result.state_changed |= state_changed;
        result
    }
}
