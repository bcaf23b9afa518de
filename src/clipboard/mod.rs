//! Clipboard access for the clear timer.
//!
//! The timer never talks to a platform clipboard directly. It goes through
//! the [`ClipboardAccess`] trait:
//!
//! - `system`: shells out to the platform clipboard tool
//! - [`MockClipboard`]: records writes for tests
//!
//! [`clear_clipboard`] owns the difference between a normal clear (one empty
//! write) and a deep clear (several overwrites first, so clipboard history
//! managers only ever capture junk).

pub mod error;
pub mod system;

pub use error::ClipboardError;
pub use system::{ClipboardTool, SystemClipboard};

use tracing::debug;

/// Number of junk overwrites performed by a deep clear.
pub const DEEP_CLEAR_PASSES: usize = 20;

/// Writes text to the system clipboard.
///
/// `Send + Sync` because clears run on a blocking worker thread.
pub trait ClipboardAccess: Send + Sync {
    /// Replaces the clipboard contents with `text`.
    fn write(&self, text: &str) -> Result<(), ClipboardError>;

    /// Returns true if a clipboard backend is present.
    fn is_available(&self) -> bool;
}

/// Which clearing variant was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearMode {
    /// One empty write
    Single,
    /// `DEEP_CLEAR_PASSES` overwrites followed by an empty write
    Deep,
}

impl ClearMode {
    /// Selects the variant for the deep-clear setting.
    pub fn from_deep_clear(deep_clear: bool) -> Self {
        if deep_clear {
            ClearMode::Deep
        } else {
            ClearMode::Single
        }
    }
}

/// Clears the clipboard using the variant selected by `deep_clear`.
///
/// # Errors
///
/// Returns the first write error. Remaining passes are not attempted.
pub fn clear_clipboard(
    access: &dyn ClipboardAccess,
    deep_clear: bool,
) -> Result<ClearMode, ClipboardError> {
    let mode = ClearMode::from_deep_clear(deep_clear);

    if mode == ClearMode::Deep {
        for pass in 0..DEEP_CLEAR_PASSES {
            access.write(&pass.to_string())?;
        }
    }
    access.write("")?;

    debug!("Clipboard cleared ({:?})", mode);
    Ok(mode)
}

/// Mock clipboard for testing.
#[derive(Debug, Default)]
pub struct MockClipboard {
    writes: std::sync::Mutex<Vec<String>>,
    available: std::sync::atomic::AtomicBool,
    should_fail: std::sync::atomic::AtomicBool,
}

impl MockClipboard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            writes: std::sync::Mutex::new(Vec::new()),
            available: std::sync::atomic::AtomicBool::new(true),
            should_fail: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available
            .store(available, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail
            .store(should_fail, std::sync::atomic::Ordering::SeqCst);
    }

    #[must_use]
    pub fn get_writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    /// Number of completed clears (writes that left the clipboard empty).
    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.is_empty())
            .count()
    }

    /// Current clipboard contents as seen by the mock.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.writes.lock().unwrap().last().cloned()
    }

    pub fn clear_recorded(&self) {
        self.writes.lock().unwrap().clear();
    }
}

impl ClipboardAccess for MockClipboard {
    fn write(&self, text: &str) -> Result<(), ClipboardError> {
        if !self.is_available() {
            return Err(ClipboardError::Unavailable);
        }
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(ClipboardError::WriteFailed("Mock failure".to_string()));
        }
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available.load(std::sync::atomic::Ordering::SeqCst)
    }
}
