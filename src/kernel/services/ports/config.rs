use serde::{Deserialize, Serialize};

use crate::models::DEFAULT_NOTE_EXTENSION;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    pub note_extension: String,
    pub new_note_label: String,
    pub new_folder_label: String,
    pub initial_note_content: String,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            note_extension: DEFAULT_NOTE_EXTENSION.to_string(),
            new_note_label: "New note".to_string(),
            new_folder_label: "New folder".to_string(),
            initial_note_content: String::new(),
        }
    }
}

impl NavigatorConfig {
    pub fn note_extension(&self) -> &str {
        self.note_extension.trim_start_matches('.')
    }
}
