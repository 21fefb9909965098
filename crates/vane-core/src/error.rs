#![forbid(unsafe_code)]

//! Failure payload carried by [`LoadState::Failed`](crate::LoadState::Failed).
//!
//! A load failure is a rendered, display-ready message, not a live error
//! value: by the time a failure reaches the state cell it has already been
//! caught at the orchestrator boundary and flattened to text. Keeping the
//! payload structural (plain `String`, derived equality) is what lets the
//! cell's change suppression treat two identical failures as the same state.

use std::fmt;

/// A rendered load failure.
///
/// Compares structurally, so publishing the same failure twice in a row is a
/// suppressed no-op at the cell level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadError {
    message: String,
}

impl LoadError {
    /// Create a failure from a display-ready message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The rendered failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LoadError {}

impl From<String> for LoadError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for LoadError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
