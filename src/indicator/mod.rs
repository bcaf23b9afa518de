//! Persistent status indicator shown while a countdown runs.
//!
//! The indicator is a low-priority, ongoing desktop notification that tells
//! the user a secret is on the clipboard and offers a tap action that clears
//! it immediately. Backends implement [`StatusIndicator`]:
//!
//! - `desktop`: `notify-send` on Linux, `osascript` on macOS. Only
//!   `notify-send` can report a tap back to the daemon.
//! - [`MockStatusIndicator`]: records calls for tests

pub mod desktop;
pub mod error;

pub use desktop::{ActionSender, DesktopIndicator, IndicatorBackend, CLEAR_ACTION};
pub use error::IndicatorError;

use crate::types::IpcRequest;

/// Identifier of the countdown notification.
pub const NOTIFICATION_ID: u32 = 1;

/// Channel the countdown notification is posted on.
pub const CHANNEL_ID: &str = "NotificationService";

/// Title shown on the notification.
pub const APP_NAME: &str = "passclip";

/// Body text of the countdown notification.
pub const CLEAR_PROMPT: &str = "Tap here to clear clipboard";

/// How prominently a notification is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Low,
    Normal,
    Critical,
}

impl Priority {
    /// Urgency name understood by `notify-send -u`.
    pub fn as_urgency(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::Critical => "critical",
        }
    }
}

/// Content of a status notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNotification {
    pub id: u32,
    pub channel_id: String,
    pub title: String,
    pub text: String,
    pub priority: Priority,
    /// Stays visible until dismissed.
    pub ongoing: bool,
    /// Daemon command issued when the notification is tapped.
    pub tap_action: IpcRequest,
}

impl StatusNotification {
    /// The notification shown for the duration of a countdown.
    #[must_use]
    pub fn countdown() -> Self {
        Self {
            id: NOTIFICATION_ID,
            channel_id: CHANNEL_ID.to_string(),
            title: APP_NAME.to_string(),
            text: CLEAR_PROMPT.to_string(),
            priority: Priority::Low,
            ongoing: true,
            tap_action: IpcRequest::ClearNow,
        }
    }
}

/// Shows and hides the countdown notification.
pub trait StatusIndicator: Send + Sync {
    /// Whether notifications must be posted on a registered channel.
    fn requires_channel(&self) -> bool;

    /// Registers `channel_id`. Registering an existing channel is a no-op.
    fn ensure_channel(&self, channel_id: &str) -> Result<(), IndicatorError>;

    /// Shows the notification, replacing any with the same id.
    fn post(&self, notification: &StatusNotification) -> Result<(), IndicatorError>;

    /// Removes the notification with `id`.
    fn dismiss(&self, id: u32) -> Result<(), IndicatorError>;

    /// Returns true if a notification backend is present.
    fn is_available(&self) -> bool;
}

/// Registers the channel if the platform needs one, then posts.
///
/// # Errors
///
/// Returns the first error from channel registration or posting.
pub fn show_indicator(
    indicator: &dyn StatusIndicator,
    notification: &StatusNotification,
) -> Result<(), IndicatorError> {
    if indicator.requires_channel() {
        indicator.ensure_channel(&notification.channel_id)?;
    }
    indicator.post(notification)
}

/// Mock status indicator for testing.
#[derive(Debug, Default)]
pub struct MockStatusIndicator {
    channels: std::sync::Mutex<Vec<String>>,
    posted: std::sync::Mutex<Vec<StatusNotification>>,
    dismissed: std::sync::Mutex<Vec<u32>>,
    requires_channel: std::sync::atomic::AtomicBool,
    available: std::sync::atomic::AtomicBool,
    should_fail: std::sync::atomic::AtomicBool,
}

impl MockStatusIndicator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: std::sync::Mutex::new(Vec::new()),
            posted: std::sync::Mutex::new(Vec::new()),
            dismissed: std::sync::Mutex::new(Vec::new()),
            requires_channel: std::sync::atomic::AtomicBool::new(true),
            available: std::sync::atomic::AtomicBool::new(true),
            should_fail: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn set_requires_channel(&self, requires: bool) {
        self.requires_channel
            .store(requires, std::sync::atomic::Ordering::SeqCst);
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
    pub fn channels(&self) -> Vec<String> {
        self.channels.lock().unwrap().clone()
    }

    #[must_use]
    pub fn posted(&self) -> Vec<StatusNotification> {
        self.posted.lock().unwrap().clone()
    }

    #[must_use]
    pub fn post_count(&self) -> usize {
        self.posted.lock().unwrap().len()
    }

    #[must_use]
    pub fn dismiss_count(&self) -> usize {
        self.dismissed.lock().unwrap().len()
    }

    /// True if a posted notification has not been dismissed since.
    #[must_use]
    pub fn is_showing(&self) -> bool {
        self.post_count() > self.dismiss_count()
    }

    fn check(&self) -> Result<(), IndicatorError> {
        if !self.is_available() {
            return Err(IndicatorError::Unavailable);
        }
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(IndicatorError::PostFailed("Mock failure".to_string()));
        }
        Ok(())
    }
}

impl StatusIndicator for MockStatusIndicator {
    fn requires_channel(&self) -> bool {
        self.requires_channel
            .load(std::sync::atomic::Ordering::SeqCst)
    }

    fn ensure_channel(&self, channel_id: &str) -> Result<(), IndicatorError> {
        self.check()?;
        let mut channels = self.channels.lock().unwrap();
        if !channels.iter().any(|c| c == channel_id) {
            channels.push(channel_id.to_string());
        }
        Ok(())
    }

    fn post(&self, notification: &StatusNotification) -> Result<(), IndicatorError> {
        self.check()?;
        self.posted.lock().unwrap().push(notification.clone());
        Ok(())
    }

    fn dismiss(&self, id: u32) -> Result<(), IndicatorError> {
        self.check()?;
        self.dismissed.lock().unwrap().push(id);
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available.load(std::sync::atomic::Ordering::SeqCst)
    }
}
