//! Daemon host owning the live clipboard service.
//!
//! Each countdown runs on its own [`ClipboardService`]. The host keeps at
//! most one instance alive, replaces it when a new countdown starts and
//! reloads the timer settings every time it creates one.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use crate::clipboard::ClipboardAccess;
use crate::indicator::StatusIndicator;
use crate::settings::Settings;
use crate::types::{ResponseData, ServicePhase, TimerSession};

use super::service::{ClipboardService, ServiceConfig, ServiceError, ServiceEvent};

/// Capacity of the daemon-wide event channel.
const EVENT_CAPACITY: usize = 64;

/// Where a fresh service reads its duration and clear mode from.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Re-read the settings file for every new service.
    File(PathBuf),
    /// Use the same values every time.
    Fixed(ServiceConfig),
}

impl ConfigSource {
    fn load(&self) -> ServiceConfig {
        match self {
            ConfigSource::File(path) => {
                ServiceConfig::from_settings(&Settings::load_or_default(path))
            }
            ConfigSource::Fixed(config) => *config,
        }
    }
}

/// Holds the clipboard and indicator backends and the current service.
pub struct Daemon {
    clipboard: Arc<dyn ClipboardAccess>,
    indicator: Arc<dyn StatusIndicator>,
    config: ConfigSource,
    events: broadcast::Sender<ServiceEvent>,
    service: Option<ClipboardService>,
}

impl Daemon {
    /// Creates a daemon with fixed timer settings.
    pub fn new(
        clipboard: Arc<dyn ClipboardAccess>,
        indicator: Arc<dyn StatusIndicator>,
        config: ServiceConfig,
    ) -> Self {
        Self::with_source(clipboard, indicator, ConfigSource::Fixed(config))
    }

    /// Creates a daemon reading timer settings from `source`.
    pub fn with_source(
        clipboard: Arc<dyn ClipboardAccess>,
        indicator: Arc<dyn StatusIndicator>,
        source: ConfigSource,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            clipboard,
            indicator,
            config: source,
            events,
            service: None,
        }
    }

    /// Subscribes to events from every service this daemon creates.
    pub fn subscribe(&self) -> broadcast::Receiver<ServiceEvent> {
        self.events.subscribe()
    }

    fn fresh_service(&self) -> ClipboardService {
        ClipboardService::with_events(
            Arc::clone(&self.clipboard),
            Arc::clone(&self.indicator),
            self.config.load(),
            self.events.clone(),
        )
    }

    /// Starts a countdown on a fresh service.
    ///
    /// A countdown already in progress is abandoned without clearing; the
    /// new one takes over the indicator and the clear.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`ClipboardService::start`].
    pub async fn start_timer(&mut self) -> Result<TimerSession, ServiceError> {
        if let Some(mut old) = self.service.take() {
            if old.phase().is_active() {
                debug!("Restarting countdown");
            }
            old.shutdown();
        }

        let mut service = self.fresh_service();
        let result = service.start().await;
        self.service = Some(service);
        result
    }

    /// Cancels any countdown and clears the clipboard immediately.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`ClipboardService::clear`].
    pub async fn clear_now(&mut self) -> Result<(), ServiceError> {
        let mut service = match self.service.take() {
            Some(live) if !live.is_terminated() => live,
            _ => self.fresh_service(),
        };
        let result = service.clear().await;
        self.service = Some(service);
        result
    }

    /// Phase and remaining time of the current service.
    pub fn status(&self) -> ResponseData {
        match &self.service {
            Some(service) => service.status(),
            None => ResponseData::from_session(ServicePhase::Idle, None),
        }
    }

    /// Phase of the current service, `Idle` if none was created.
    pub fn phase(&self) -> ServicePhase {
        self.service
            .as_ref()
            .map_or(ServicePhase::Idle, ClipboardService::phase)
    }

    /// Stops the daemon's service. A running countdown clears the
    /// clipboard first so no secret outlives the daemon.
    pub async fn shutdown(&mut self) {
        if let Some(mut service) = self.service.take() {
            if service.phase().is_active() {
                let _ = service.clear().await;
            }
            service.shutdown();
        }
    }
}
