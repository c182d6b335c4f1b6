use super::*;
use crate::kernel::context_menu::NavigatorCommand;
use crate::kernel::{Action, DispatchResult, Effect, NavigatorState, RequestId, Store, TreeError};
use crate::kernel::services::ports::{EntryKind, NavigatorConfig, StorageEntry, StorageError};
use crate::models::{DraftMode, NodeKind};
use std::path::{Path, PathBuf};

fn file(path: &str) -> StorageEntry {
    StorageEntry::new(PathBuf::from(path), EntryKind::File)
}

fn dir(path: &str) -> StorageEntry {
    StorageEntry::new(PathBuf::from(path), EntryKind::Directory)
}

fn request_of(result: &DispatchResult) -> RequestId {
    assert_eq!(result.effects.len(), 1, "effects: {:?}", result.effects);
    result.effects[0].request().unwrap()
}

fn complete_read(
    store: &mut Store,
    result: &DispatchResult,
    entries: Vec<StorageEntry>,
) -> DispatchResult {
    store.dispatch(Action::DirectoryRead {
        request: request_of(result),
        entries,
    })
}

/// `/ws` with `Notes/` (unloaded), `Welcome.md` and a hidden `.git/`.
fn opened() -> Store {
    let mut store = Store::new(NavigatorState::new(
        PathBuf::from("/ws"),
        NavigatorConfig::default(),
    ));
    let open = store.dispatch(Action::OpenWorkspace {
        root: PathBuf::from("/ws"),
    });
    assert_eq!(
        open.effects,
        vec![Effect::ReadDirectory {
            request: request_of(&open),
            path: PathBuf::from("/ws"),
        }]
    );
    complete_read(
        &mut store,
        &open,
        vec![file("/ws/Welcome.md"), dir("/ws/Notes"), dir("/ws/.git")],
    );
    store
}

fn names(store: &Store, path: &str) -> Vec<String> {
    store
        .state()
        .tree
        .child_listing(Path::new(path))
        .unwrap()
        .into_iter()
        .map(|n| n.display_name().to_string())
        .collect()
}

fn expand_loaded(store: &mut Store, path: &str, entries: Vec<StorageEntry>) {
    let expand = store.dispatch(Action::Expand {
        path: PathBuf::from(path),
    });
    complete_read(store, &expand, entries);
    assert!(store.state().tree.is_expanded(Path::new(path)));
}

fn assert_valid(store: &Store) {
    store.state().tree.validate().unwrap();
}

#[test]
fn expand_materializes_empty_folder_once() {
    let mut store = opened();
    assert_eq!(names(&store, "/ws"), vec!["Notes", "Welcome.md"]);

    let expand = store.dispatch(Action::Expand {
        path: PathBuf::from("/ws/Notes"),
    });
    assert!(matches!(
        &expand.effects[..],
        [Effect::ReadDirectory { path, .. }] if path == Path::new("/ws/Notes")
    ));
    assert!(store.state().is_loading(Path::new("/ws/Notes")));
    complete_read(&mut store, &expand, Vec::new());

    let notes = store.state().tree.get_by_path(Path::new("/ws/Notes")).unwrap();
    assert!(notes.is_loaded());
    let notes_id = store.state().tree.find_by_path(Path::new("/ws/Notes")).unwrap();
    assert_eq!(store.state().tree.children(notes_id), Some(Vec::new()));
    assert!(store.state().tree.is_expanded(Path::new("/ws/Notes")));
    assert_valid(&store);
}

#[test]
fn collapse_and_reexpand_do_not_read_again() {
    let mut store = opened();
    expand_loaded(&mut store, "/ws/Notes", vec![file("/ws/Notes/a.md")]);

    let collapse = store.dispatch(Action::Expand {
        path: PathBuf::from("/ws/Notes"),
    });
    assert!(collapse.effects.is_empty());
    assert!(!store.state().tree.is_expanded(Path::new("/ws/Notes")));
    assert!(store.state().tree.find_by_path(Path::new("/ws/Notes/a.md")).is_some());

    let reexpand = store.dispatch(Action::Expand {
        path: PathBuf::from("/ws/Notes"),
    });
    assert!(reexpand.effects.is_empty());
    assert!(store.state().tree.is_expanded(Path::new("/ws/Notes")));
}

#[test]
fn expand_on_note_is_noop() {
    let mut store = opened();
    let result = store.dispatch(Action::Expand {
        path: PathBuf::from("/ws/Welcome.md"),
    });
    assert!(result.effects.is_empty());
    assert!(!result.state_changed);
    assert!(result.is_ok());
}

#[test]
fn ordering_ignores_gateway_order() {
    let mut store = opened();
    expand_loaded(
        &mut store,
        "/ws/Notes",
        vec![
            file("/ws/Notes/b.md"),
            dir("/ws/Notes/Zeta"),
            file("/ws/Notes/A.md"),
            dir("/ws/Notes/alpha"),
            file("/ws/Notes/.hidden.md"),
        ],
    );
    assert_eq!(names(&store, "/ws/Notes"), vec!["Zeta", "alpha", "A.md", "b.md"]);
}

#[test]
fn create_note_appends_extension_and_refreshes_parent() {
    let mut store = opened();
    let create = store.dispatch(Action::CreateNote {
        parent: PathBuf::from("/ws"),
        name: "  todo ".to_string(),
    });
    let request = request_of(&create);
    assert_eq!(
        create.effects[0],
        Effect::CreateFile {
            request,
            dir: PathBuf::from("/ws"),
            name: "todo.md".to_string(),
            content: String::new(),
        }
    );
    assert!(store.state().tree.find_by_path(Path::new("/ws/todo.md")).is_none());

    let done = store.dispatch(Action::PathCreated {
        request,
        path: PathBuf::from("/ws/todo.md"),
    });
    assert!(store.state().tree.find_by_path(Path::new("/ws/todo.md")).is_some());
    assert!(matches!(
        &done.effects[..],
        [Effect::ReadDirectory { path, .. }] if path == Path::new("/ws")
    ));

    complete_read(
        &mut store,
        &done,
        vec![file("/ws/Welcome.md"), dir("/ws/Notes"), file("/ws/todo.md")],
    );
    assert_eq!(names(&store, "/ws"), vec!["Notes", "Welcome.md", "todo.md"]);
    assert_valid(&store);
}

#[test]
fn create_conflict_is_reported_and_tree_unchanged() {
    let mut store = opened();
    let create = store.dispatch(Action::CreateFolder {
        parent: PathBuf::from("/ws"),
        name: "Notes".to_string(),
    });
    let failed = store.dispatch(Action::GatewayFailed {
        request: request_of(&create),
        error: StorageError::AlreadyExists(PathBuf::from("/ws/Notes")),
    });
    assert_eq!(
        failed.error,
        Some(TreeError::NameConflict(PathBuf::from("/ws/Notes")))
    );
    assert_eq!(
        store.state().last_error,
        Some(TreeError::NameConflict(PathBuf::from("/ws/Notes")))
    );
    assert_eq!(names(&store, "/ws"), vec!["Notes", "Welcome.md"]);
    assert_eq!(store.state().pending_requests(), 0);
}

#[test]
fn create_rejects_bad_names_without_gateway_call() {
    let mut store = opened();
    for (name, expected) in [
        ("   ", TreeError::EmptyName),
        ("a/b", TreeError::InvalidName("a/b".to_string())),
        ("..", TreeError::InvalidName("..".to_string())),
    ] {
        let result = store.dispatch(Action::CreateNote {
            parent: PathBuf::from("/ws"),
            name: name.to_string(),
        });
        assert!(result.effects.is_empty());
        assert_eq!(result.error, Some(expected));
    }

    let into_note = store.dispatch(Action::CreateNote {
        parent: PathBuf::from("/ws/Welcome.md"),
        name: "x".to_string(),
    });
    assert_eq!(
        into_note.error,
        Some(TreeError::NotADirectory(PathBuf::from("/ws/Welcome.md")))
    );
}

#[test]
fn rename_directory_rewrites_loaded_subtree_and_expansion() {
    let mut store = opened();
    expand_loaded(&mut store, "/ws/Notes", vec![dir("/ws/Notes/b")]);
    expand_loaded(&mut store, "/ws/Notes/b", vec![file("/ws/Notes/b/d.md")]);

    let rename = store.dispatch(Action::Rename {
        path: PathBuf::from("/ws/Notes/b"),
        new_name: "c".to_string(),
    });
    assert!(matches!(
        &rename.effects[..],
        [Effect::Rename { from, to, .. }]
            if from == Path::new("/ws/Notes/b") && to == Path::new("/ws/Notes/c")
    ));
    store.dispatch(Action::PathRenamed {
        request: request_of(&rename),
    });

    let tree = &store.state().tree;
    assert!(tree.find_by_path(Path::new("/ws/Notes/c/d.md")).is_some());
    assert!(tree.find_by_path(Path::new("/ws/Notes/b/d.md")).is_none());
    assert!(tree.is_expanded(Path::new("/ws/Notes/c")));
    assert!(!tree.is_expanded(Path::new("/ws/Notes/b")));
    assert_valid(&store);
}

#[test]
fn rename_to_same_name_skips_gateway() {
    let mut store = opened();
    let result = store.dispatch(Action::Rename {
        path: PathBuf::from("/ws/Welcome.md"),
        new_name: "Welcome".to_string(),
    });
    assert!(result.effects.is_empty());
    assert!(result.is_ok());
}

#[test]
fn root_cannot_be_renamed_or_deleted() {
    let mut store = opened();
    let rename = store.dispatch(Action::Rename {
        path: PathBuf::from("/ws"),
        new_name: "other".to_string(),
    });
    assert_eq!(rename.error, Some(TreeError::RootImmutable));
    let delete = store.dispatch(Action::DeleteRecursive {
        path: PathBuf::from("/ws"),
    });
    assert_eq!(delete.error, Some(TreeError::RootImmutable));
}

#[test]
fn delete_prunes_nested_expansion_but_not_lookalike_sibling() {
    let mut store = opened();
    expand_loaded(&mut store, "/ws/Notes", vec![dir("/ws/Notes/b"), dir("/ws/Notes/bb")]);
    expand_loaded(&mut store, "/ws/Notes/b", vec![dir("/ws/Notes/b/c")]);
    expand_loaded(&mut store, "/ws/Notes/b/c", Vec::new());
    expand_loaded(&mut store, "/ws/Notes/bb", Vec::new());

    let delete = store.dispatch(Action::DeleteRecursive {
        path: PathBuf::from("/ws/Notes/b"),
    });
    // Nothing changes before the gateway confirms.
    assert!(store.state().tree.find_by_path(Path::new("/ws/Notes/b")).is_some());
    store.dispatch(Action::PathDeleted {
        request: request_of(&delete),
    });

    let tree = &store.state().tree;
    assert!(tree.find_by_path(Path::new("/ws/Notes/b/c")).is_none());
    assert!(!tree.is_expanded(Path::new("/ws/Notes/b")));
    assert!(!tree.is_expanded(Path::new("/ws/Notes/b/c")));
    assert!(tree.is_expanded(Path::new("/ws/Notes/bb")));
    assert_valid(&store);
}

#[test]
fn failed_delete_leaves_subtree_intact() {
    let mut store = opened();
    expand_loaded(&mut store, "/ws/Notes", vec![file("/ws/Notes/a.md")]);

    let delete = store.dispatch(Action::DeleteRecursive {
        path: PathBuf::from("/ws/Notes"),
    });
    let failed = store.dispatch(Action::GatewayFailed {
        request: request_of(&delete),
        error: StorageError::io("/ws/Notes", "permission denied"),
    });
    assert!(matches!(failed.error, Some(TreeError::Io { .. })));
    assert!(store.state().tree.find_by_path(Path::new("/ws/Notes/a.md")).is_some());
    assert!(store.state().tree.is_expanded(Path::new("/ws/Notes")));
    assert_valid(&store);
}

#[test]
fn stale_read_after_delete_does_not_resurrect() {
    let mut store = opened();
    expand_loaded(&mut store, "/ws/Notes", Vec::new());

    let refresh = store.dispatch(Action::Refresh {
        path: PathBuf::from("/ws/Notes"),
    });
    let delete = store.dispatch(Action::DeleteRecursive {
        path: PathBuf::from("/ws/Notes"),
    });
    store.dispatch(Action::PathDeleted {
        request: request_of(&delete),
    });

    let late = complete_read(&mut store, &refresh, vec![file("/ws/Notes/ghost.md")]);
    assert!(!late.state_changed);
    assert!(late.is_ok());
    assert!(store.state().tree.find_by_path(Path::new("/ws/Notes")).is_none());
    assert!(store.state().tree.find_by_path(Path::new("/ws/Notes/ghost.md")).is_none());
    assert_valid(&store);
}

#[test]
fn superseded_read_is_dropped() {
    let mut store = opened();
    let first = store.dispatch(Action::Refresh {
        path: PathBuf::from("/ws"),
    });
    let second = store.dispatch(Action::Refresh {
        path: PathBuf::from("/ws"),
    });

    complete_read(&mut store, &second, vec![file("/ws/new.md")]);
    let stale = complete_read(&mut store, &first, vec![file("/ws/old.md")]);
    assert!(!stale.state_changed);
    assert_eq!(names(&store, "/ws"), vec!["new.md"]);
}

#[test]
fn expand_survives_refresh_of_same_folder() {
    let mut store = opened();
    let expand = store.dispatch(Action::Expand {
        path: PathBuf::from("/ws/Notes"),
    });
    let refresh = store.dispatch(Action::Refresh {
        path: PathBuf::from("/ws/Notes"),
    });

    let late = complete_read(&mut store, &expand, vec![file("/ws/Notes/old.md")]);
    assert!(!late.state_changed);
    complete_read(&mut store, &refresh, vec![file("/ws/Notes/a.md")]);

    assert!(store.state().tree.is_expanded(Path::new("/ws/Notes")));
    assert_eq!(names(&store, "/ws/Notes"), vec!["a.md"]);
    assert!(!store.state().is_loading(Path::new("/ws/Notes")));
    assert_valid(&store);
}

#[test]
fn expand_survives_refresh_after_create_in_same_folder() {
    let mut store = opened();
    let expand = store.dispatch(Action::Expand {
        path: PathBuf::from("/ws/Notes"),
    });
    let create = store.dispatch(Action::CreateNote {
        parent: PathBuf::from("/ws/Notes"),
        name: "todo".to_string(),
    });
    let created = store.dispatch(Action::PathCreated {
        request: request_of(&create),
        path: PathBuf::from("/ws/Notes/todo.md"),
    });
    assert!(matches!(
        &created.effects[..],
        [Effect::ReadDirectory { path, .. }] if path == Path::new("/ws/Notes")
    ));

    complete_read(&mut store, &expand, Vec::new());
    complete_read(&mut store, &created, vec![file("/ws/Notes/todo.md")]);

    assert!(store.state().tree.is_expanded(Path::new("/ws/Notes")));
    assert_eq!(names(&store, "/ws/Notes"), vec!["todo.md"]);
    assert_valid(&store);
}

#[test]
fn unknown_completion_is_ignored() {
    let mut store = opened();
    let result = store.dispatch(Action::PathDeleted {
        request: RequestId(999),
    });
    assert!(!result.state_changed);
    assert!(result.is_ok());
}

#[test]
fn reopening_workspace_drops_in_flight_results() {
    let mut store = opened();
    let expand = store.dispatch(Action::Expand {
        path: PathBuf::from("/ws/Notes"),
    });
    let reopen = store.dispatch(Action::OpenWorkspace {
        root: PathBuf::from("/other"),
    });

    let late = complete_read(&mut store, &expand, vec![file("/ws/Notes/a.md")]);
    assert!(!late.state_changed);
    assert!(request_of(&reopen) > request_of(&expand));
    assert_eq!(store.state().workspace_root(), Path::new("/other"));
}

#[test]
fn racing_renames_leave_one_node_at_last_target() {
    let mut store = opened();
    let refresh = store.dispatch(Action::Refresh {
        path: PathBuf::from("/ws"),
    });
    complete_read(&mut store, &refresh, vec![file("/ws/a.md")]);

    let first = store.dispatch(Action::Rename {
        path: PathBuf::from("/ws/a.md"),
        new_name: "b".to_string(),
    });
    let second = store.dispatch(Action::Rename {
        path: PathBuf::from("/ws/a.md"),
        new_name: "c".to_string(),
    });
    store.dispatch(Action::PathRenamed {
        request: request_of(&first),
    });
    store.dispatch(Action::PathRenamed {
        request: request_of(&second),
    });

    assert_eq!(names(&store, "/ws"), vec!["c.md"]);
    assert!(store.state().tree.find_by_path(Path::new("/ws/b.md")).is_none());
    assert_valid(&store);
}

#[test]
fn rename_completion_evicts_stale_occupant() {
    let mut store = opened();
    let refresh = store.dispatch(Action::Refresh {
        path: PathBuf::from("/ws"),
    });
    complete_read(&mut store, &refresh, vec![file("/ws/a.md"), file("/ws/b.md")]);

    // `b.md` was removed outside the app before the rename ran.
    let rename = store.dispatch(Action::Rename {
        path: PathBuf::from("/ws/a.md"),
        new_name: "b.md".to_string(),
    });
    store.dispatch(Action::PathRenamed {
        request: request_of(&rename),
    });
    assert_eq!(names(&store, "/ws"), vec!["b.md"]);
    assert_valid(&store);
}

#[test]
fn rename_onto_placeholder_path_moves_draft_aside() {
    let mut store = opened();
    let refresh = store.dispatch(Action::Refresh {
        path: PathBuf::from("/ws"),
    });
    complete_read(&mut store, &refresh, vec![file("/ws/a.md")]);
    store.dispatch(Action::BeginAdd {
        kind: NodeKind::Note,
        anchor: PathBuf::from("/ws"),
    });
    assert_eq!(
        store.state().draft.as_ref().unwrap().provisional_path,
        PathBuf::from("/ws/New note.md")
    );

    let rename = store.dispatch(Action::Rename {
        path: PathBuf::from("/ws/a.md"),
        new_name: "New note".to_string(),
    });
    store.dispatch(Action::PathRenamed {
        request: request_of(&rename),
    });

    let draft = store.state().draft.clone().unwrap();
    assert_eq!(draft.provisional_path, PathBuf::from("/ws/New note 2.md"));
    assert!(draft.error.is_none());
    assert_eq!(names(&store, "/ws"), vec!["New note.md", "New note"]);
    let renamed = store.state().tree.get_by_path(Path::new("/ws/New note.md")).unwrap();
    assert!(!renamed.is_draft());
    assert_valid(&store);
}

#[test]
fn expand_on_folder_placeholder_does_not_read() {
    let mut store = opened();
    store.dispatch(Action::BeginAdd {
        kind: NodeKind::Directory,
        anchor: PathBuf::from("/ws"),
    });
    let placeholder = store.state().draft.clone().unwrap().provisional_path;
    assert_eq!(placeholder, PathBuf::from("/ws/New folder"));

    let result = store.dispatch(Action::Expand { path: placeholder });
    assert!(result.effects.is_empty());
    assert!(result.is_ok());
    assert!(store.state().last_error.is_none());
    assert_eq!(store.state().pending_requests(), 0);
}

#[test]
fn add_draft_commit_replaces_placeholder() {
    let mut store = opened();
    let begin = store.dispatch(Action::BeginAdd {
        kind: NodeKind::Note,
        anchor: PathBuf::from("/ws"),
    });
    assert!(begin.effects.is_empty());
    assert_eq!(names(&store, "/ws"), vec!["Notes", "Welcome.md", "New note"]);
    let draft = store.state().draft.clone().unwrap();
    assert_eq!(draft.provisional_path, PathBuf::from("/ws/New note.md"));

    let commit = store.dispatch(Action::CommitDraft {
        name: "todo".to_string(),
    });
    let request = request_of(&commit);
    assert!(matches!(
        &commit.effects[0],
        Effect::CreateFile { dir, name, .. } if dir == Path::new("/ws") && name == "todo.md"
    ));
    let again = store.dispatch(Action::CommitDraft {
        name: "todo".to_string(),
    });
    assert_eq!(again.error, Some(TreeError::DraftPending));

    store.dispatch(Action::PathCreated {
        request,
        path: PathBuf::from("/ws/todo.md"),
    });
    assert!(store.state().draft.is_none());
    let node = store.state().tree.get_by_path(Path::new("/ws/todo.md")).unwrap();
    assert!(!node.is_draft());
    assert!(store.state().tree.find_by_path(Path::new("/ws/New note.md")).is_none());
    assert_valid(&store);
}

#[test]
fn add_draft_failure_keeps_draft_for_retry() {
    let mut store = opened();
    store.dispatch(Action::BeginAdd {
        kind: NodeKind::Directory,
        anchor: PathBuf::from("/ws"),
    });
    let empty = store.dispatch(Action::CommitDraft {
        name: " ".to_string(),
    });
    assert_eq!(empty.error, Some(TreeError::EmptyName));
    assert_eq!(
        store.state().draft.as_ref().and_then(|d| d.error.clone()),
        Some(TreeError::EmptyName)
    );

    let commit = store.dispatch(Action::CommitDraft {
        name: "Notes".to_string(),
    });
    store.dispatch(Action::GatewayFailed {
        request: request_of(&commit),
        error: StorageError::AlreadyExists(PathBuf::from("/ws/Notes")),
    });
    let draft = store.state().draft.clone().unwrap();
    assert_eq!(draft.error, Some(TreeError::NameConflict(PathBuf::from("/ws/Notes"))));
    assert!(!draft.is_committing());
    assert!(store.state().tree.get_by_path(Path::new("/ws/New folder")).unwrap().is_draft());

    let retry = store.dispatch(Action::CommitDraft {
        name: "Journal".to_string(),
    });
    assert!(matches!(
        &retry.effects[..],
        [Effect::CreateFolder { path, .. }] if path == Path::new("/ws/Journal")
    ));
}

#[test]
fn add_draft_on_unloaded_folder_waits_for_listing() {
    let mut store = opened();
    let begin = store.dispatch(Action::BeginAdd {
        kind: NodeKind::Note,
        anchor: PathBuf::from("/ws/Notes"),
    });
    assert!(store.state().draft.as_ref().unwrap().node.is_none());

    complete_read(&mut store, &begin, vec![file("/ws/Notes/New note.md")]);
    let draft = store.state().draft.clone().unwrap();
    assert!(draft.node.is_some());
    assert_eq!(draft.provisional_path, PathBuf::from("/ws/Notes/New note 2.md"));
    assert!(store.state().tree.is_expanded(Path::new("/ws/Notes")));
    assert_valid(&store);
}

#[test]
fn add_draft_anchored_on_note_uses_its_folder() {
    let mut store = opened();
    expand_loaded(&mut store, "/ws/Notes", vec![file("/ws/Notes/a.md")]);
    store.dispatch(Action::BeginAdd {
        kind: NodeKind::Note,
        anchor: PathBuf::from("/ws/Notes/a.md"),
    });
    let draft = store.state().draft.clone().unwrap();
    assert_eq!(draft.anchor_path, PathBuf::from("/ws/Notes"));
    assert_eq!(names(&store, "/ws/Notes"), vec!["a.md", "New note"]);
}

#[test]
fn cancel_rename_draft_restores_node_without_gateway_call() {
    let mut store = opened();
    let begin = store.dispatch(Action::BeginRename {
        path: PathBuf::from("/ws/Welcome.md"),
    });
    assert!(begin.effects.is_empty());
    let node = store.state().tree.get_by_path(Path::new("/ws/Welcome.md")).unwrap();
    assert_eq!(node.draft_mode(), Some(DraftMode::Rename));

    let cancel = store.dispatch(Action::CancelDraft);
    assert!(cancel.effects.is_empty());
    assert!(cancel.state_changed);
    let node = store.state().tree.get_by_path(Path::new("/ws/Welcome.md")).unwrap();
    assert!(!node.is_draft());
    assert_eq!(node.display_name(), "Welcome.md");
    assert!(store.state().draft.is_none());
    assert_eq!(store.state().pending_requests(), 0);
}

#[test]
fn begin_rename_expands_collapsed_ancestors() {
    let mut store = opened();
    expand_loaded(&mut store, "/ws/Notes", vec![dir("/ws/Notes/deep")]);
    expand_loaded(&mut store, "/ws/Notes/deep", vec![file("/ws/Notes/deep/x.md")]);
    store.dispatch(Action::Expand {
        path: PathBuf::from("/ws/Notes"),
    });
    assert!(!store.state().tree.is_expanded(Path::new("/ws/Notes")));

    store.dispatch(Action::BeginRename {
        path: PathBuf::from("/ws/Notes/deep/x.md"),
    });
    assert!(store.state().tree.is_expanded(Path::new("/ws/Notes")));
    assert!(store.state().tree.is_expanded(Path::new("/ws/Notes/deep")));
}

#[test]
fn begin_add_cancels_active_rename_draft() {
    let mut store = opened();
    store.dispatch(Action::BeginRename {
        path: PathBuf::from("/ws/Welcome.md"),
    });
    store.dispatch(Action::BeginAdd {
        kind: NodeKind::Note,
        anchor: PathBuf::from("/ws"),
    });

    let welcome = store.state().tree.get_by_path(Path::new("/ws/Welcome.md")).unwrap();
    assert!(!welcome.is_draft());
    assert_eq!(store.state().draft.as_ref().unwrap().mode, DraftMode::Add);
    assert_valid(&store);
}

#[test]
fn rename_draft_commit_clears_flag_on_rewritten_node() {
    let mut store = opened();
    store.dispatch(Action::BeginRename {
        path: PathBuf::from("/ws/Welcome.md"),
    });
    let commit = store.dispatch(Action::CommitDraft {
        name: "Hello".to_string(),
    });
    store.dispatch(Action::PathRenamed {
        request: request_of(&commit),
    });

    let node = store.state().tree.get_by_path(Path::new("/ws/Hello.md")).unwrap();
    assert!(!node.is_draft());
    assert_eq!(node.display_name(), "Hello.md");
    assert!(store.state().draft.is_none());
}

#[test]
fn cancel_during_commit_detaches_draft() {
    let mut store = opened();
    store.dispatch(Action::BeginAdd {
        kind: NodeKind::Note,
        anchor: PathBuf::from("/ws"),
    });
    let commit = store.dispatch(Action::CommitDraft {
        name: "later".to_string(),
    });
    store.dispatch(Action::CancelDraft);
    assert!(store.state().draft.is_none());
    assert!(store.state().tree.find_by_path(Path::new("/ws/New note.md")).is_none());

    store.dispatch(Action::PathCreated {
        request: request_of(&commit),
        path: PathBuf::from("/ws/later.md"),
    });
    assert!(store.state().tree.find_by_path(Path::new("/ws/later.md")).is_some());
    assert!(store.state().draft.is_none());
    assert_valid(&store);
}

#[test]
fn deleting_draft_folder_ends_draft() {
    let mut store = opened();
    expand_loaded(&mut store, "/ws/Notes", Vec::new());
    store.dispatch(Action::BeginAdd {
        kind: NodeKind::Note,
        anchor: PathBuf::from("/ws/Notes"),
    });
    let delete = store.dispatch(Action::DeleteRecursive {
        path: PathBuf::from("/ws/Notes"),
    });
    store.dispatch(Action::PathDeleted {
        request: request_of(&delete),
    });
    assert!(store.state().draft.is_none());
    assert_valid(&store);
}

#[test]
fn commit_without_draft_fails() {
    let mut store = opened();
    let result = store.dispatch(Action::CommitDraft {
        name: "x".to_string(),
    });
    assert_eq!(result.error, Some(TreeError::NoDraft));
    assert!(!store.dispatch(Action::CancelDraft).state_changed);
}

#[test]
fn activate_opens_notes_and_toggles_folders() {
    let mut store = opened();
    let note = store.dispatch(Action::Activate {
        path: PathBuf::from("/ws/Welcome.md"),
    });
    assert_eq!(note.effects, vec![Effect::OpenNote(PathBuf::from("/ws/Welcome.md"))]);

    let folder = store.dispatch(Action::Activate {
        path: PathBuf::from("/ws/Notes"),
    });
    assert!(matches!(&folder.effects[..], [Effect::ReadDirectory { .. }]));

    store.dispatch(Action::BeginAdd {
        kind: NodeKind::Note,
        anchor: PathBuf::from("/ws"),
    });
    let draft = store.dispatch(Action::Activate {
        path: PathBuf::from("/ws/New note.md"),
    });
    assert!(draft.effects.is_empty());
    assert!(!draft.state_changed);
}

#[test]
fn run_command_maps_onto_operations() {
    let mut store = opened();
    store.dispatch(Action::RunCommand {
        command: NavigatorCommand::NewFolder,
        target: None,
    });
    assert_eq!(names(&store, "/ws"), vec!["Notes", "New folder", "Welcome.md"]);

    store.dispatch(Action::RunCommand {
        command: NavigatorCommand::Rename,
        target: Some(PathBuf::from("/ws/Welcome.md")),
    });
    assert_eq!(store.state().draft.as_ref().unwrap().mode, DraftMode::Rename);
    assert!(store.state().tree.find_by_path(Path::new("/ws/New folder")).is_none());

    let delete = store.dispatch(Action::RunCommand {
        command: NavigatorCommand::Delete,
        target: Some(PathBuf::from("/ws/Notes")),
    });
    assert!(matches!(
        &delete.effects[..],
        [Effect::DeleteRecursive { path, .. }] if path == Path::new("/ws/Notes")
    ));

    let untargeted = store.dispatch(Action::RunCommand {
        command: NavigatorCommand::Delete,
        target: None,
    });
    assert!(untargeted.effects.is_empty());
}

#[test]
fn missing_path_is_not_user_visible() {
    let mut store = opened();
    let result = store.dispatch(Action::Expand {
        path: PathBuf::from("/ws/nowhere"),
    });
    assert_eq!(result.error, Some(TreeError::NotFound(PathBuf::from("/ws/nowhere"))));
    assert!(store.state().last_error.is_none());
}
