use tracing::debug;

use crate::kernel::context_menu::NavigatorCommand;
use crate::kernel::store::{DispatchResult, Store};
use crate::kernel::Action;
use crate::models::NodeKind;

impl Store {
    pub(crate) fn reduce_context_menu_action(&mut self, action: Action) -> DispatchResult {
        let Action::RunCommand { command, target } = action else {
            return DispatchResult::unchanged();
        };
        debug!(command = command.id(), target = ?target, "navigator command");

        match command {
            NavigatorCommand::NewNote | NavigatorCommand::NewFolder => {
                let kind = if command == NavigatorCommand::NewNote {
                    NodeKind::Note
                } else {
                    NodeKind::Directory
                };
                let anchor = target.unwrap_or_else(|| self.state.tree.root_path().to_path_buf());
                self.dispatch(Action::BeginAdd { kind, anchor })
            }
            NavigatorCommand::Rename => match target {
                Some(path) => self.dispatch(Action::BeginRename { path }),
                None => DispatchResult::unchanged(),
            },
            NavigatorCommand::Delete => match target {
                Some(path) => self.dispatch(Action::DeleteRecursive { path }),
                None => DispatchResult::unchanged(),
            },
        }
    }
}
