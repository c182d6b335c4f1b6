//! 工作区会话：串联 Store 与存储网关
//!
//! 每个公开操作都会派发一个动作，执行其产生的网关调用，再把完成结果派发回
//! Store，直到没有后续调用为止。

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::services::adapters::execute;
use super::services::ports::{NavigatorConfig, StorageGateway};
use super::{Action, DraftSession, Effect, NavigatorCommand, NavigatorState, Store, TreeError};
use crate::models::{NodeId, NodeKind, TreeRow};

pub struct WorkspaceTreeSession {
    gateway: Arc<dyn StorageGateway>,
    store: Mutex<Store>,
}

impl WorkspaceTreeSession {
    /// Builds a session and loads the root listing.
    pub async fn open(
        gateway: Arc<dyn StorageGateway>,
        root: PathBuf,
        config: NavigatorConfig,
    ) -> Result<Self, TreeError> {
        let session = Self {
            gateway,
            store: Mutex::new(Store::new(NavigatorState::new(root.clone(), config))),
        };
        session.open_workspace(root).await?;
        Ok(session)
    }

    pub fn gateway(&self) -> &Arc<dyn StorageGateway> {
        &self.gateway
    }

    /// Dispatches `action` and drives every resulting gateway call to
    /// completion. Returns the notes the action asked to open, or the first
    /// error reported along the way.
    pub async fn dispatch(&self, action: Action) -> Result<Vec<PathBuf>, TreeError> {
        let mut queue = VecDeque::from([action]);
        let mut opened = Vec::new();
        let mut first_error = None;

        while let Some(action) = queue.pop_front() {
            let result = self.store.lock().await.dispatch(action);
            if let Some(err) = result.error {
                debug!(error = %err, "dispatch reported error");
                first_error.get_or_insert(err);
            }
            for effect in result.effects {
                if let Effect::OpenNote(path) = effect {
                    opened.push(path);
                    continue;
                }
                if let Some(completion) = execute(self.gateway.as_ref(), effect).await {
                    queue.push_back(completion);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(opened),
        }
    }

    async fn run(&self, action: Action) -> Result<(), TreeError> {
        self.dispatch(action).await.map(drop)
    }

    pub async fn open_workspace(&self, root: PathBuf) -> Result<(), TreeError> {
        info!(root = %root.display(), "loading workspace");
        self.run(Action::OpenWorkspace { root }).await
    }

    /// Asks the gateway for a folder and opens it. `Ok(None)` when the user
    /// declined; the current workspace is left untouched.
    pub async fn open_workspace_dialog(&self) -> Result<Option<PathBuf>, TreeError> {
        let Some(root) = self.gateway.open_folder().await? else {
            return Ok(None);
        };
        self.open_workspace(root.clone()).await?;
        Ok(Some(root))
    }

    pub async fn expand(&self, path: impl Into<PathBuf>) -> Result<(), TreeError> {
        self.run(Action::Expand { path: path.into() }).await
    }

    pub async fn refresh_folder(&self, path: impl Into<PathBuf>) -> Result<(), TreeError> {
        self.run(Action::Refresh { path: path.into() }).await
    }

    pub async fn create_note(
        &self,
        parent: impl Into<PathBuf>,
        name: impl Into<String>,
    ) -> Result<(), TreeError> {
        self.run(Action::CreateNote {
            parent: parent.into(),
            name: name.into(),
        })
        .await
    }

    pub async fn create_folder(
        &self,
        parent: impl Into<PathBuf>,
        name: impl Into<String>,
    ) -> Result<(), TreeError> {
        self.run(Action::CreateFolder {
            parent: parent.into(),
            name: name.into(),
        })
        .await
    }

    pub async fn rename(
        &self,
        path: impl Into<PathBuf>,
        new_name: impl Into<String>,
    ) -> Result<(), TreeError> {
        self.run(Action::Rename {
            path: path.into(),
            new_name: new_name.into(),
        })
        .await
    }

    pub async fn delete_recursive(&self, path: impl Into<PathBuf>) -> Result<(), TreeError> {
        self.run(Action::DeleteRecursive { path: path.into() }).await
    }

    pub async fn begin_add(&self, kind: NodeKind, anchor: impl Into<PathBuf>) -> Result<(), TreeError> {
        self.run(Action::BeginAdd {
            kind,
            anchor: anchor.into(),
        })
        .await
    }

    pub async fn begin_rename(&self, path: impl Into<PathBuf>) -> Result<(), TreeError> {
        self.run(Action::BeginRename { path: path.into() }).await
    }

    pub async fn commit_draft(&self, name: impl Into<String>) -> Result<(), TreeError> {
        self.run(Action::CommitDraft { name: name.into() }).await
    }

    pub async fn cancel_draft(&self) -> Result<(), TreeError> {
        self.run(Action::CancelDraft).await
    }

    /// Returns the note to open, if the activated row was a note.
    pub async fn activate(&self, path: impl Into<PathBuf>) -> Result<Option<PathBuf>, TreeError> {
        let mut opened = self.dispatch(Action::Activate { path: path.into() }).await?;
        Ok(opened.pop())
    }

    pub async fn run_command(
        &self,
        command: NavigatorCommand,
        target: Option<PathBuf>,
    ) -> Result<(), TreeError> {
        self.run(Action::RunCommand { command, target }).await
    }

    pub async fn read_note(&self, path: &Path) -> Result<String, TreeError> {
        Ok(self.gateway.read_file(path).await?)
    }

    pub async fn write_note(&self, path: &Path, content: &str) -> Result<(), TreeError> {
        Ok(self.gateway.write_file(path, content).await?)
    }

    pub async fn with_state<R>(&self, f: impl FnOnce(&NavigatorState) -> R) -> R {
        let store = self.store.lock().await;
        f(store.state())
    }

    pub async fn find_by_path(&self, path: &Path) -> Option<NodeId> {
        self.with_state(|s| s.tree.find_by_path(path)).await
    }

    pub async fn is_expanded(&self, path: &Path) -> bool {
        self.with_state(|s| s.tree.is_expanded(path)).await
    }

    /// Display names of the ordered child listing; `None` while unloaded.
    pub async fn child_names(&self, path: &Path) -> Option<Vec<String>> {
        self.with_state(|s| {
            s.tree.child_listing(path).map(|nodes| {
                nodes
                    .into_iter()
                    .map(|n| n.display_name().to_string())
                    .collect()
            })
        })
        .await
    }

    pub async fn rows(&self) -> Vec<TreeRow> {
        self.with_state(|s| s.tree.flatten_for_view()).await
    }

    pub async fn draft(&self) -> Option<DraftSession> {
        self.with_state(|s| s.draft.clone()).await
    }

    pub async fn last_error(&self) -> Option<TreeError> {
        self.with_state(|s| s.last_error.clone()).await
    }

    pub async fn workspace_root(&self) -> PathBuf {
        self.with_state(|s| s.workspace_root().to_path_buf()).await
    }
}
