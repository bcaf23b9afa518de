//! Desktop notification backend.
//!
//! Linux posts through `notify-send`; the notification category doubles as
//! the channel and a synchronous hint keyed on the notification id makes
//! each post replace the previous one. With an [`ActionSender`] attached,
//! the post carries a "clear" action and `notify-send --wait` stays alive
//! on a background thread until the bubble is clicked or closed.
//! macOS posts through `osascript`, which has no channels, no actions and
//! no way to withdraw a delivered notification.

use std::collections::HashSet;
use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::platform::has_program;
use crate::types::IpcRequest;

use super::error::IndicatorError;
use super::{StatusIndicator, StatusNotification, APP_NAME};

/// How long the "cleared" replacement stays visible, in milliseconds.
const CLEARED_EXPIRE_MS: u32 = 1500;

/// Action key `notify-send --wait` prints when the clear action is chosen.
pub const CLEAR_ACTION: &str = "clear";

/// Label of the clear action button.
const CLEAR_ACTION_LABEL: &str = "Clear clipboard";

/// Receives the tap action of a clicked notification.
pub type ActionSender = mpsc::UnboundedSender<IpcRequest>;

/// Notification tool used by [`DesktopIndicator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorBackend {
    NotifySend,
    Osascript,
}

impl IndicatorBackend {
    /// Executable name.
    pub fn program(&self) -> &'static str {
        match self {
            IndicatorBackend::NotifySend => "notify-send",
            IndicatorBackend::Osascript => "osascript",
        }
    }

    /// Picks the backend for the current platform, if its tool is installed.
    pub fn detect() -> Option<Self> {
        let candidate = if cfg!(target_os = "macos") {
            IndicatorBackend::Osascript
        } else {
            IndicatorBackend::NotifySend
        };
        has_program(candidate.program()).then_some(candidate)
    }
}

/// Synchronous hint that groups every post for `id` into one bubble.
fn replace_hint(id: u32) -> String {
    format!("string:x-canonical-private-synchronous:{}-{}", APP_NAME, id)
}

/// Quotes `text` for an AppleScript string literal.
fn applescript_quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Arguments for `notify-send`. `with_action` adds the clear action and
/// makes the tool wait for the bubble to close.
fn notify_send_args(notification: &StatusNotification, with_action: bool) -> Vec<String> {
    let expire = if notification.ongoing { 0 } else { 5000 };
    let mut args = vec![
        "--app-name".to_string(),
        APP_NAME.to_string(),
        "--urgency".to_string(),
        notification.priority.as_urgency().to_string(),
        "--category".to_string(),
        notification.channel_id.clone(),
        "--expire-time".to_string(),
        expire.to_string(),
        "--hint".to_string(),
        replace_hint(notification.id),
    ];
    if with_action {
        args.push(format!("--action={}={}", CLEAR_ACTION, CLEAR_ACTION_LABEL));
        args.push("--wait".to_string());
    }
    args.push(notification.title.clone());
    args.push(notification.text.clone());
    args
}

/// Forwards `tap_action` for every clear action reported on `reader`.
///
/// Returns how many actions were forwarded. Stops early once nobody
/// listens on `actions`.
fn forward_actions<R: BufRead>(reader: R, tap_action: &IpcRequest, actions: &ActionSender) -> usize {
    let mut forwarded = 0;
    for line in reader.lines() {
        let Ok(line) = line else { break };
        if line.trim() != CLEAR_ACTION {
            continue;
        }
        debug!("Notification action chosen: {:?}", tap_action);
        if actions.send(tap_action.clone()).is_err() {
            break;
        }
        forwarded += 1;
    }
    forwarded
}

/// AppleScript for `osascript -e`.
fn osascript_source(notification: &StatusNotification) -> String {
    format!(
        "display notification {} with title {}",
        applescript_quote(&notification.text),
        applescript_quote(&notification.title)
    )
}

/// Status indicator backed by the desktop notification daemon.
#[derive(Debug)]
pub struct DesktopIndicator {
    backend: Option<IndicatorBackend>,
    channels: Mutex<HashSet<String>>,
    actions: Option<ActionSender>,
    /// `notify-send --wait` process of the bubble currently shown.
    waiting: Mutex<Option<Child>>,
}

impl DesktopIndicator {
    /// Detects the platform backend. The indicator is unavailable if none is found.
    #[must_use]
    pub fn new() -> Self {
        let backend = IndicatorBackend::detect();
        match backend {
            Some(b) => debug!("Using notification backend: {}", b.program()),
            None => debug!("No notification backend found on PATH"),
        }
        Self::with_backend(backend)
    }

    /// Uses a specific backend without probing.
    #[must_use]
    pub fn with_backend(backend: Option<IndicatorBackend>) -> Self {
        Self {
            backend,
            channels: Mutex::new(HashSet::new()),
            actions: None,
            waiting: Mutex::new(None),
        }
    }

    /// Reports notification taps on `actions`.
    #[must_use]
    pub fn with_actions(mut self, actions: ActionSender) -> Self {
        self.actions = Some(actions);
        self
    }

    fn waiting(&self) -> MutexGuard<'_, Option<Child>> {
        self.waiting.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Ends the `notify-send --wait` process of the previous post, if any.
    fn stop_waiting(&self) {
        if let Some(mut child) = self.waiting().take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    /// Posts with the clear action and listens for it on a background thread.
    fn post_with_action(
        &self,
        notification: &StatusNotification,
        actions: &ActionSender,
    ) -> Result<(), IndicatorError> {
        let backend = IndicatorBackend::NotifySend;
        self.stop_waiting();

        let mut child = Command::new(backend.program())
            .args(notify_send_args(notification, true))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| IndicatorError::SpawnFailed(backend.program().to_string(), e.to_string()))?;

        if let Some(stdout) = child.stdout.take() {
            let tap_action = notification.tap_action.clone();
            let actions = actions.clone();
            let spawned = std::thread::Builder::new()
                .name("passclip-notify".to_string())
                .spawn(move || forward_actions(BufReader::new(stdout), &tap_action, &actions));
            if let Err(e) = spawned {
                warn!("Failed to listen for notification actions: {}", e);
            }
        }

        *self.waiting() = Some(child);
        Ok(())
    }

    /// Returns the selected backend.
    pub fn backend(&self) -> Option<IndicatorBackend> {
        self.backend
    }

    fn run(&self, backend: IndicatorBackend, args: &[String]) -> Result<(), IndicatorError> {
        let output = Command::new(backend.program())
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| IndicatorError::SpawnFailed(backend.program().to_string(), e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(IndicatorError::PostFailed(stderr.trim().to_string()));
        }
        Ok(())
    }
}

impl Default for DesktopIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DesktopIndicator {
    fn drop(&mut self) {
        self.stop_waiting();
    }
}

impl StatusIndicator for DesktopIndicator {
    fn requires_channel(&self) -> bool {
        self.backend == Some(IndicatorBackend::NotifySend)
    }

    fn ensure_channel(&self, channel_id: &str) -> Result<(), IndicatorError> {
        if channel_id.trim().is_empty() {
            return Err(IndicatorError::ChannelFailed(
                "channel id must not be empty".to_string(),
            ));
        }
        let mut channels = self
            .channels
            .lock()
            .map_err(|e| IndicatorError::ChannelFailed(e.to_string()))?;
        if channels.insert(channel_id.to_string()) {
            debug!("Registered notification channel {}", channel_id);
        }
        Ok(())
    }

    fn post(&self, notification: &StatusNotification) -> Result<(), IndicatorError> {
        let backend = self.backend.ok_or(IndicatorError::Unavailable)?;
        match backend {
            IndicatorBackend::NotifySend => match &self.actions {
                Some(actions) => self.post_with_action(notification, actions),
                None => self.run(backend, &notify_send_args(notification, false)),
            },
            IndicatorBackend::Osascript => self.run(
                backend,
                &["-e".to_string(), osascript_source(notification)],
            ),
        }
    }

    fn dismiss(&self, id: u32) -> Result<(), IndicatorError> {
        let backend = self.backend.ok_or(IndicatorError::Unavailable)?;
        self.stop_waiting();
        match backend {
            // Replace the persistent bubble with one that expires on its own
            IndicatorBackend::NotifySend => self.run(
                backend,
                &[
                    "--app-name".to_string(),
                    APP_NAME.to_string(),
                    "--urgency".to_string(),
                    "low".to_string(),
                    "--expire-time".to_string(),
                    CLEARED_EXPIRE_MS.to_string(),
                    "--hint".to_string(),
                    replace_hint(id),
                    APP_NAME.to_string(),
                    "Clipboard cleared".to_string(),
                ],
            ),
            IndicatorBackend::Osascript => Ok(()),
        }
    }

    fn is_available(&self) -> bool {
        self.backend.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_programs() {
        assert_eq!(IndicatorBackend::NotifySend.program(), "notify-send");
        assert_eq!(IndicatorBackend::Osascript.program(), "osascript");
    }

    #[test]
    fn test_notify_send_args() {
        let args = notify_send_args(&StatusNotification::countdown(), false);
        assert!(args.windows(2).any(|w| w == ["--urgency", "low"]));
        assert!(args.windows(2).any(|w| w == ["--category", "NotificationService"]));
        assert!(args.windows(2).any(|w| w == ["--expire-time", "0"]));
        assert!(args.contains(&"string:x-canonical-private-synchronous:passclip-1".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--action") || a == "--wait"));
        assert_eq!(args[args.len() - 2], "passclip");
        assert_eq!(args[args.len() - 1], "Tap here to clear clipboard");
    }

    #[test]
    fn test_notify_send_args_with_clear_action() {
        let args = notify_send_args(&StatusNotification::countdown(), true);
        assert!(args.contains(&"--action=clear=Clear clipboard".to_string()));
        assert!(args.contains(&"--wait".to_string()));
        // Options come before the positional title and body
        assert_eq!(args[args.len() - 2], "passclip");
    }

    mod action_tests {
        use super::*;
        use std::io::Cursor;

        #[test]
        fn test_clear_action_forwards_tap_action() {
            let (tx, mut rx) = mpsc::unbounded_channel();

            let forwarded = forward_actions(Cursor::new("clear\n"), &IpcRequest::ClearNow, &tx);

            assert_eq!(forwarded, 1);
            assert_eq!(rx.try_recv().unwrap(), IpcRequest::ClearNow);
            assert!(rx.try_recv().is_err());
        }

        #[test]
        fn test_close_without_action_forwards_nothing() {
            let (tx, mut rx) = mpsc::unbounded_channel();

            let forwarded = forward_actions(Cursor::new(""), &IpcRequest::ClearNow, &tx);

            assert_eq!(forwarded, 0);
            assert!(rx.try_recv().is_err());
        }

        #[test]
        fn test_other_output_is_ignored() {
            let (tx, mut rx) = mpsc::unbounded_channel();

            let forwarded =
                forward_actions(Cursor::new("default\n clear \n"), &IpcRequest::ClearNow, &tx);

            assert_eq!(forwarded, 1);
            assert_eq!(rx.try_recv().unwrap(), IpcRequest::ClearNow);
        }

        #[test]
        fn test_stops_when_receiver_dropped() {
            let (tx, rx) = mpsc::unbounded_channel();
            drop(rx);

            let forwarded =
                forward_actions(Cursor::new("clear\nclear\n"), &IpcRequest::ClearNow, &tx);

            assert_eq!(forwarded, 0);
        }

        #[test]
        fn test_with_actions_keeps_backend() {
            let (tx, _rx) = mpsc::unbounded_channel();
            let indicator =
                DesktopIndicator::with_backend(Some(IndicatorBackend::NotifySend)).with_actions(tx);
            assert!(indicator.actions.is_some());
            assert_eq!(indicator.backend(), Some(IndicatorBackend::NotifySend));
        }
    }

    #[test]
    fn test_osascript_quotes() {
        let mut n = StatusNotification::countdown();
        n.text = "say \"hi\"".to_string();
        assert_eq!(
            osascript_source(&n),
            r#"display notification "say \"hi\"" with title "passclip""#
        );
    }

    #[test]
    fn test_channel_requirement_follows_backend() {
        assert!(DesktopIndicator::with_backend(Some(IndicatorBackend::NotifySend)).requires_channel());
        assert!(!DesktopIndicator::with_backend(Some(IndicatorBackend::Osascript)).requires_channel());
        assert!(!DesktopIndicator::with_backend(None).requires_channel());
    }

    #[test]
    fn test_ensure_channel_idempotent() {
        let indicator = DesktopIndicator::with_backend(Some(IndicatorBackend::NotifySend));
        indicator.ensure_channel("NotificationService").unwrap();
        indicator.ensure_channel("NotificationService").unwrap();
        assert_eq!(indicator.channels.lock().unwrap().len(), 1);
        assert!(indicator.ensure_channel(" ").is_err());
    }

    #[test]
    fn test_without_backend_is_unavailable() {
        let indicator = DesktopIndicator::with_backend(None);
        assert!(!indicator.is_available());
        assert_eq!(
            indicator.post(&StatusNotification::countdown()),
            Err(IndicatorError::Unavailable)
        );
        assert_eq!(indicator.dismiss(1), Err(IndicatorError::Unavailable));
    }
}
