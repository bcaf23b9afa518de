//! Daemon module for the clipboard timer.
//!
//! This module contains the core daemon functionality:
//! - `service`: one countdown-then-clear lifecycle
//! - `host`: owns the live service and replaces it between countdowns
//! - `ipc`: Unix socket server that feeds commands to the host

pub mod host;
pub mod ipc;
pub mod service;

pub use host::{ConfigSource, Daemon};
pub use ipc::{dispatch_actions, serve, IpcError, IpcServer, RequestHandler};
pub use service::{ClipboardService, ServiceConfig, ServiceError, ServiceEvent};

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{debug, info};

use crate::clipboard::SystemClipboard;
use crate::indicator::DesktopIndicator;
use crate::settings::Settings;

/// Logs service events until the channel closes.
async fn log_events(mut rx: broadcast::Receiver<ServiceEvent>) {
    loop {
        match rx.recv().await {
            Ok(ServiceEvent::Started {
                session_id,
                seconds,
            }) => info!("Countdown {} started ({}s)", session_id, seconds),
            Ok(ServiceEvent::Tick { remaining_seconds }) => {
                debug!("{}s until clipboard clear", remaining_seconds)
            }
            Ok(ServiceEvent::ClipboardCleared) => info!("Clipboard cleared"),
            Ok(ServiceEvent::Cancelled) => info!("Countdown cancelled, clipboard cleared"),
            Err(broadcast::error::RecvError::Lagged(n)) => debug!("Missed {} events", n),
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Runs the daemon in the foreground until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the socket cannot be bound.
pub async fn run(settings: Settings, settings_path: std::path::PathBuf) -> Result<()> {
    let (action_tx, action_rx) = mpsc::unbounded_channel();
    let daemon = Daemon::with_source(
        Arc::new(SystemClipboard::new()),
        Arc::new(DesktopIndicator::new().with_actions(action_tx)),
        ConfigSource::File(settings_path),
    );
    let logger = tokio::spawn(log_events(daemon.subscribe()));
    let daemon = Arc::new(Mutex::new(daemon));

    let server = IpcServer::new(&settings.socket_path)
        .with_context(|| format!("Failed to start daemon on {:?}", settings.socket_path))?;
    info!("passclip daemon listening on {:?}", server.socket_path());

    let handler = Arc::new(RequestHandler::new(Arc::clone(&daemon)));
    let actions = tokio::spawn(dispatch_actions(action_rx, Arc::clone(&handler)));
    serve(server, handler, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await;

    actions.abort();
    daemon.lock().await.shutdown().await;
    logger.abort();
    info!("passclip daemon stopped");
    Ok(())
}
