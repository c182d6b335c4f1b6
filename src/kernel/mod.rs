//! Headless navigator core (state/action/effect) and its async session.

pub mod action;
pub mod context_menu;
pub mod effect;
pub mod error;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

pub use action::Action;
pub use context_menu::{menu_entries, ContextMenuEntry, ContextMenuScope, NavigatorCommand};
pub use effect::{Effect, RequestId};
pub use error::TreeError;
pub use session::WorkspaceTreeSession;
pub use state::{DraftSession, NavigatorState, PendingOp};
pub use store::{DispatchResult, Store};
