//! Clipboard-clear timer service.
//!
//! A [`ClipboardService`] accepts two commands:
//! - `start`: show the status indicator, count down the configured number of
//!   seconds on a background task, then clear the clipboard
//! - `clear`: cancel any countdown and clear the clipboard now
//!
//! Both end in `Terminated`, after which the instance rejects further
//! commands and the daemon replaces it with a fresh one.

use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, warn};

use crate::clipboard::{clear_clipboard, ClipboardAccess};
use crate::indicator::{show_indicator, StatusIndicator, StatusNotification, NOTIFICATION_ID};
use crate::settings::Settings;
use crate::types::{ResponseData, ServicePhase, TimerSession, DEFAULT_SHOW_TIME_SECONDS};

/// Capacity of the event broadcast channel.
const EVENT_CAPACITY: usize = 64;

// ============================================================================
// ServiceEvent
// ============================================================================

/// Events broadcast by the service to in-process listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEvent {
    /// A countdown began
    Started {
        /// Session identifier
        session_id: String,
        /// Configured duration
        seconds: u32,
    },
    /// One second elapsed
    Tick {
        /// Seconds left before clearing
        remaining_seconds: u32,
    },
    /// The countdown ran to completion and the clipboard is being cleared
    ClipboardCleared,
    /// The countdown was cancelled by a clear command
    Cancelled,
}

// ============================================================================
// ServiceError / ServiceConfig
// ============================================================================

/// Errors returned by service commands.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The service already cleared the clipboard and stopped.
    #[error("Clipboard service has terminated")]
    Terminated,

    /// A countdown is already running on this instance.
    #[error("A countdown is already running")]
    AlreadyRunning,
}

/// Values the service reads from the settings when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Countdown length. Zero clears immediately.
    pub show_seconds: u32,
    /// Overwrite the clipboard repeatedly before emptying it.
    pub deep_clear: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            show_seconds: DEFAULT_SHOW_TIME_SECONDS,
            deep_clear: false,
        }
    }
}

impl ServiceConfig {
    /// Extracts the timer values from the settings file.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            show_seconds: settings.show_time_seconds(),
            deep_clear: settings.deep_clear(),
        }
    }
}

// ============================================================================
// Shared state
// ============================================================================

#[derive(Debug, Default)]
struct ServiceState {
    phase: ServicePhase,
    session: Option<TimerSession>,
    indicator_shown: bool,
}

/// State and collaborators shared between the service and its countdown task.
struct Shared {
    clipboard: Arc<dyn ClipboardAccess>,
    indicator: Arc<dyn StatusIndicator>,
    events: broadcast::Sender<ServiceEvent>,
    state: Mutex<ServiceState>,
}

/// What the caller that moved the service to `Terminated` must clean up.
struct Teardown {
    deep_clear: bool,
    dismiss: bool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ServiceState> {
        // State stays consistent even if a holder panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: ServiceEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Moves to `Terminated`. Only the first caller succeeds.
    fn terminate(&self, config: &ServiceConfig) -> Result<Teardown, ServiceError> {
        let mut state = self.lock();
        if state.phase.is_terminated() {
            return Err(ServiceError::Terminated);
        }
        state.phase = ServicePhase::Terminated;
        let deep_clear = match state.session.as_mut() {
            Some(session) => {
                session.deactivate();
                session.deep_clear
            }
            None => config.deep_clear,
        };
        Ok(Teardown {
            deep_clear,
            dismiss: std::mem::take(&mut state.indicator_shown),
        })
    }

    /// Clears the clipboard and removes the indicator on a blocking thread.
    async fn clear_and_dismiss(&self, teardown: Teardown) {
        let clipboard = Arc::clone(&self.clipboard);
        let indicator = Arc::clone(&self.indicator);

        let result = tokio::task::spawn_blocking(move || {
            if clipboard.is_available() {
                if let Err(e) = clear_clipboard(clipboard.as_ref(), teardown.deep_clear) {
                    warn!("Failed to clear clipboard: {}", e);
                }
            } else {
                debug!("Clipboard unavailable, skipping clear");
            }

            if teardown.dismiss {
                if let Err(e) = indicator.dismiss(NOTIFICATION_ID) {
                    debug!("Failed to dismiss status indicator: {}", e);
                }
            }
        })
        .await;

        if let Err(e) = result {
            warn!("Clipboard clear task failed: {}", e);
        }
    }

    /// Natural end of a countdown.
    async fn complete(&self, config: &ServiceConfig) {
        let teardown = match self.terminate(config) {
            Ok(teardown) => teardown,
            // Lost the race against a clear command
            Err(_) => return,
        };
        debug!("Countdown complete, clearing clipboard");
        self.emit(ServiceEvent::ClipboardCleared);
        self.clear_and_dismiss(teardown).await;
    }
}

// ============================================================================
// ClipboardService
// ============================================================================

/// One countdown-then-clear lifecycle.
pub struct ClipboardService {
    shared: Arc<Shared>,
    config: ServiceConfig,
    cancel_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl ClipboardService {
    /// Creates an idle service with its own event channel.
    pub fn new(
        clipboard: Arc<dyn ClipboardAccess>,
        indicator: Arc<dyn StatusIndicator>,
        config: ServiceConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self::with_events(clipboard, indicator, config, events)
    }

    /// Creates an idle service that publishes on an existing channel.
    pub fn with_events(
        clipboard: Arc<dyn ClipboardAccess>,
        indicator: Arc<dyn StatusIndicator>,
        config: ServiceConfig,
        events: broadcast::Sender<ServiceEvent>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                clipboard,
                indicator,
                events,
                state: Mutex::new(ServiceState::default()),
            }),
            config,
            cancel_tx: None,
            task: None,
        }
    }

    /// Subscribes to service events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServiceEvent> {
        self.shared.events.subscribe()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> ServicePhase {
        self.shared.lock().phase
    }

    /// Returns true once the service can no longer accept commands.
    pub fn is_terminated(&self) -> bool {
        self.phase().is_terminated()
    }

    /// Snapshot of the running session, if any.
    pub fn session(&self) -> Option<TimerSession> {
        self.shared.lock().session.clone()
    }

    /// Status payload for IPC responses.
    pub fn status(&self) -> ResponseData {
        let state = self.shared.lock();
        let session = state.session.as_ref().filter(|s| s.active);
        ResponseData::from_session(state.phase, session)
    }

    /// Configuration captured at construction.
    pub fn config(&self) -> ServiceConfig {
        self.config
    }

    /// Starts the countdown.
    ///
    /// A zero-second duration clears the clipboard before returning and
    /// never shows the indicator.
    ///
    /// # Errors
    ///
    /// Returns `Terminated` if the service already finished, or
    /// `AlreadyRunning` if a countdown is in progress.
    pub async fn start(&mut self) -> Result<TimerSession, ServiceError> {
        let session = {
            let mut state = self.shared.lock();
            match state.phase {
                ServicePhase::Terminated => return Err(ServiceError::Terminated),
                ServicePhase::CountingDown => return Err(ServiceError::AlreadyRunning),
                ServicePhase::Idle => {}
            }
            let session = TimerSession::new(self.config.show_seconds, self.config.deep_clear);
            state.phase = ServicePhase::CountingDown;
            state.session = Some(session.clone());
            session
        };

        debug!(
            "Starting countdown {} ({}s, deep clear: {})",
            session.id, session.show_seconds, session.deep_clear
        );
        self.shared.emit(ServiceEvent::Started {
            session_id: session.id.clone(),
            seconds: session.show_seconds,
        });

        if session.is_complete() {
            self.shared.complete(&self.config).await;
            return Ok(session);
        }

        self.show_indicator().await;

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let shared = Arc::clone(&self.shared);
        let config = self.config;
        self.task = Some(tokio::spawn(async move {
            run_countdown(shared, config, cancel_rx).await;
        }));
        self.cancel_tx = Some(cancel_tx);

        Ok(session)
    }

    /// Cancels any countdown and clears the clipboard immediately.
    ///
    /// No `ClipboardCleared` event is emitted.
    ///
    /// # Errors
    ///
    /// Returns `Terminated` if the service already finished.
    pub async fn clear(&mut self) -> Result<(), ServiceError> {
        let teardown = self.shared.terminate(&self.config)?;
        self.stop_task();
        debug!("Clear requested, clipboard cleared immediately");
        self.shared.emit(ServiceEvent::Cancelled);
        self.shared.clear_and_dismiss(teardown).await;
        Ok(())
    }

    /// Waits for a running countdown to finish.
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!("Countdown task failed: {}", e);
                }
            }
        }
    }

    /// Stops the countdown without clearing the clipboard.
    ///
    /// The instance is terminated afterwards. A completion already in
    /// progress is left to finish.
    pub fn shutdown(&mut self) {
        let was_counting = {
            let mut state = self.shared.lock();
            let was_counting = state.phase.is_active();
            state.phase = ServicePhase::Terminated;
            if let Some(session) = state.session.as_mut() {
                session.deactivate();
            }
            was_counting
        };
        if was_counting {
            self.stop_task();
        } else {
            self.task.take();
        }
    }

    async fn show_indicator(&mut self) {
        let indicator = Arc::clone(&self.shared.indicator);
        if !indicator.is_available() {
            debug!("Status indicator unavailable, skipping");
            return;
        }

        let result = tokio::task::spawn_blocking(move || {
            show_indicator(indicator.as_ref(), &StatusNotification::countdown())
        })
        .await;

        match result {
            Ok(Ok(())) => self.shared.lock().indicator_shown = true,
            Ok(Err(e)) => debug!("Failed to show status indicator: {}", e),
            Err(e) => warn!("Status indicator task failed: {}", e),
        }
    }

    fn stop_task(&mut self) {
        if let Some(cancel_tx) = self.cancel_tx.take() {
            let _ = cancel_tx.send(true);
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ClipboardService {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Background countdown: one tick per second until completion or cancel.
async fn run_countdown(
    shared: Arc<Shared>,
    config: ServiceConfig,
    mut cancel_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;

            changed = cancel_rx.changed() => {
                if changed.is_err() || *cancel_rx.borrow() {
                    debug!("Countdown cancelled");
                    return;
                }
            }
            _ = ticker.tick() => {
                let tick = {
                    let mut state = shared.lock();
                    if !state.phase.is_active() {
                        return;
                    }
                    state
                        .session
                        .as_mut()
                        .map(|session| (session.tick(), session.remaining_seconds()))
                };

                let Some((complete, remaining_seconds)) = tick else {
                    return;
                };
                shared.emit(ServiceEvent::Tick { remaining_seconds });

                if complete {
                    shared.complete(&config).await;
                    return;
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
