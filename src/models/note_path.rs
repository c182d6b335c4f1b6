//! 路径工具：笔记扩展名、隐藏文件、同级路径与前缀重写

use std::fmt;
use std::path::{Path, PathBuf};

pub const HIDDEN_MARKER: char = '.';
pub const DEFAULT_NOTE_EXTENSION: &str = "md";

const MARKDOWN_EXTENSIONS: [&str; 3] = ["md", "mdx", "markdown"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    Empty,
    Invalid(String),
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::Empty => write!(f, "name must not be empty"),
            NameError::Invalid(name) => write!(f, "invalid name: {name:?}"),
        }
    }
}

impl std::error::Error for NameError {}

pub fn is_hidden(name: &str) -> bool {
    name.starts_with(HIDDEN_MARKER)
}

/// Trims the user-typed name and rejects anything that would not stay a
/// single path segment.
pub fn validate_entry_name(name: &str) -> Result<&str, NameError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(NameError::Empty);
    }
    if trimmed == "." || trimmed == ".." || trimmed.contains(['/', '\\']) {
        return Err(NameError::Invalid(trimmed.to_string()));
    }
    Ok(trimmed)
}

/// `todo` -> `todo.md`; names that already carry the extension are kept.
pub fn note_file_name(name: &str, extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        return name.to_string();
    }
    let has_extension = Path::new(name)
        .extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension));
    if has_extension {
        name.to_string()
    } else {
        format!("{name}.{extension}")
    }
}

pub fn sibling_path(path: &Path, new_name: &str) -> PathBuf {
    path.with_file_name(new_name)
}

pub fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Segment-wise ancestry: `/a/bb` is not within `/a/b`.
pub fn is_same_or_within(path: &Path, ancestor: &Path) -> bool {
    path.starts_with(ancestor)
}

/// Moves `path` from under `from` to under `to`, keeping the relative suffix.
pub fn rebase(path: &Path, from: &Path, to: &Path) -> Option<PathBuf> {
    let rel = path.strip_prefix(from).ok()?;
    if rel.as_os_str().is_empty() {
        return Some(to.to_path_buf());
    }
    Some(to.join(rel))
}

pub fn is_markdown_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_string_lossy();
        MARKDOWN_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/models/note_path.rs"]
mod tests;
