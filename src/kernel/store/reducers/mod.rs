mod completion;
mod context_menu;
mod draft;
mod navigator;
