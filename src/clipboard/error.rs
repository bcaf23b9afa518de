//! Clipboard access error types.

use thiserror::Error;

/// Errors that can occur while writing the system clipboard.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// No clipboard backend is available on this system.
    #[error("Clipboard service is not available")]
    Unavailable,

    /// The clipboard tool could not be started.
    #[error("Failed to run clipboard tool '{0}': {1}")]
    SpawnFailed(String, String),

    /// The clipboard tool ran but reported a failure.
    #[error("Clipboard write failed: {0}")]
    WriteFailed(String),
}

impl ClipboardError {
    /// Returns true if the error means there is no clipboard at all.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ClipboardError::Unavailable.to_string(),
            "Clipboard service is not available"
        );
        let err = ClipboardError::SpawnFailed("xclip".into(), "not found".into());
        assert!(err.to_string().contains("xclip"));
    }

    #[test]
    fn test_is_unavailable() {
        assert!(ClipboardError::Unavailable.is_unavailable());
        assert!(!ClipboardError::WriteFailed("x".into()).is_unavailable());
    }
}
