use std::path::PathBuf;

use super::context_menu::NavigatorCommand;
use super::effect::RequestId;
use super::services::ports::{StorageEntry, StorageError};
use crate::models::NodeKind;

#[derive(Debug, Clone)]
pub enum Action {
    OpenWorkspace {
        root: PathBuf,
    },
    Expand {
        path: PathBuf,
    },
    Refresh {
        path: PathBuf,
    },
    CreateNote {
        parent: PathBuf,
        name: String,
    },
    CreateFolder {
        parent: PathBuf,
        name: String,
    },
    Rename {
        path: PathBuf,
        new_name: String,
    },
    DeleteRecursive {
        path: PathBuf,
    },
    /// Click on a row: notes open, directories toggle.
    Activate {
        path: PathBuf,
    },

    BeginAdd {
        kind: NodeKind,
        anchor: PathBuf,
    },
    BeginRename {
        path: PathBuf,
    },
    CommitDraft {
        name: String,
    },
    CancelDraft,

    RunCommand {
        command: NavigatorCommand,
        target: Option<PathBuf>,
    },

    // Gateway completions.
    DirectoryRead {
        request: RequestId,
        entries: Vec<StorageEntry>,
    },
    PathCreated {
        request: RequestId,
        path: PathBuf,
    },
    PathRenamed {
        request: RequestId,
    },
    PathDeleted {
        request: RequestId,
    },
    GatewayFailed {
        request: RequestId,
        error: StorageError,
    },
}
