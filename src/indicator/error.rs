//! Status indicator error types.

use thiserror::Error;

/// Errors that can occur while showing or hiding the status indicator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IndicatorError {
    /// No notification backend is present.
    #[error("No desktop notification backend available")]
    Unavailable,

    /// The notification tool could not be started.
    #[error("Failed to run {0}: {1}")]
    SpawnFailed(String, String),

    /// The notification tool reported a failure.
    #[error("Failed to post notification: {0}")]
    PostFailed(String),

    /// The notification channel could not be registered.
    #[error("Failed to create notification channel: {0}")]
    ChannelFailed(String),
}

impl IndicatorError {
    /// Returns true if the backend is missing rather than failing.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}
