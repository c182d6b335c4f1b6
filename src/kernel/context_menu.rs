//! 导航栏右键菜单：命令标识、标签与按目标类型筛选

use std::fmt;

use crate::models::NodeKind;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NavigatorCommand {
    NewNote,
    NewFolder,
    Rename,
    Delete,
}

impl NavigatorCommand {
    pub const ALL: [NavigatorCommand; 4] = [
        NavigatorCommand::NewNote,
        NavigatorCommand::NewFolder,
        NavigatorCommand::Rename,
        NavigatorCommand::Delete,
    ];

    pub fn id(self) -> &'static str {
        match self {
            NavigatorCommand::NewNote => "new-note",
            NavigatorCommand::NewFolder => "new-folder",
            NavigatorCommand::Rename => "rename",
            NavigatorCommand::Delete => "delete",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.id() == id)
    }

    pub fn label(self) -> &'static str {
        match self {
            NavigatorCommand::NewNote => "New Note",
            NavigatorCommand::NewFolder => "New Folder",
            NavigatorCommand::Rename => "Rename...",
            NavigatorCommand::Delete => "Delete",
        }
    }

    pub fn is_destructive(self) -> bool {
        matches!(self, NavigatorCommand::Delete)
    }

    /// Whether the command acts on an existing row rather than creating one.
    pub fn needs_target(self) -> bool {
        matches!(self, NavigatorCommand::Rename | NavigatorCommand::Delete)
    }
}

impl fmt::Display for NavigatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// What the menu was opened on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContextMenuScope {
    EmptyArea,
    Node(NodeKind),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextMenuEntry {
    pub command: NavigatorCommand,
    pub label: &'static str,
    pub destructive: bool,
}

impl From<NavigatorCommand> for ContextMenuEntry {
    fn from(command: NavigatorCommand) -> Self {
        Self {
            command,
            label: command.label(),
            destructive: command.is_destructive(),
        }
    }
}

pub fn menu_entries(scope: ContextMenuScope) -> Vec<ContextMenuEntry> {
    let commands: &[NavigatorCommand] = match scope {
        ContextMenuScope::EmptyArea => &[NavigatorCommand::NewFolder, NavigatorCommand::NewNote],
        ContextMenuScope::Node(NodeKind::Note) => {
            &[NavigatorCommand::Rename, NavigatorCommand::Delete]
        }
        ContextMenuScope::Node(NodeKind::Directory) => &[
            NavigatorCommand::NewNote,
            NavigatorCommand::NewFolder,
            NavigatorCommand::Rename,
            NavigatorCommand::Delete,
        ],
    };
    commands.iter().copied().map(ContextMenuEntry::from).collect()
}
