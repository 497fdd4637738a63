//! Lifecycle states of a sort session

use std::fmt;

/// Where a session is in the upload, validate, sort, serialize flow
///
/// `Error` is not terminal: a new upload, a retried sort or export, or a
/// reset all lead out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Empty,
    /// Bytes decoded into a document
    Loaded,
    /// Target sheet and required columns resolved
    Validated,
    /// Sorted document built
    Sorted,
    /// Sorted document serialized and available for download
    Ready,
    Error,
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Empty => "empty",
            SessionState::Loaded => "loaded",
            SessionState::Validated => "validated",
            SessionState::Sorted => "sorted",
            SessionState::Ready => "ready",
            SessionState::Error => "error",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
