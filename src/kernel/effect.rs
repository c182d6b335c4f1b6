use std::fmt;
use std::path::PathBuf;

/// Correlates a gateway call with its completion action.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub(crate) u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ReadDirectory {
        request: RequestId,
        path: PathBuf,
    },
    CreateFile {
        request: RequestId,
        dir: PathBuf,
        name: String,
        content: String,
    },
    CreateFolder {
        request: RequestId,
        path: PathBuf,
    },
    Rename {
        request: RequestId,
        from: PathBuf,
        to: PathBuf,
    },
    DeleteRecursive {
        request: RequestId,
        path: PathBuf,
    },
    OpenNote(PathBuf),
}

impl Effect {
    pub fn request(&self) -> Option<RequestId> {
        match self {
            Effect::ReadDirectory { request, .. }
            | Effect::CreateFile { request, .. }
            | Effect::CreateFolder { request, .. }
            | Effect::Rename { request, .. }
            | Effect::DeleteRecursive { request, .. } => Some(*request),
            Effect::OpenNote(_) => None,
        }
    }
}
