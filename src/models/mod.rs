//! 数据模型层

pub mod note_path;
pub mod note_tree;

pub use note_path::{
    is_hidden, is_markdown_file, note_file_name, validate_entry_name, NameError,
    DEFAULT_NOTE_EXTENSION, HIDDEN_MARKER,
};
pub use note_tree::{
    ChildEntry, DraftMode, MergeReport, NodeId, NodeKind, NoteTree, NoteTreeError, TreeNode,
    TreeRow,
};
