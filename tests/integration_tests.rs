//! Integration tests for daemon-CLI IPC communication.
//!
//! A real `IpcServer` and `Daemon` run over a temporary socket while the
//! CLI's `IpcClient` talks to them. Clipboard and indicator are mocks.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

use passclip::cli::client::IpcClient;
use passclip::clipboard::{MockClipboard, DEEP_CLEAR_PASSES};
use passclip::daemon::{serve, Daemon, IpcServer, RequestHandler, ServiceConfig, ServiceEvent};
use passclip::indicator::MockStatusIndicator;

// ============================================================================
// Test Helpers
// ============================================================================

struct TestDaemon {
    _dir: tempfile::TempDir,
    socket_path: PathBuf,
    clipboard: Arc<MockClipboard>,
    indicator: Arc<MockStatusIndicator>,
    daemon: Arc<Mutex<Daemon>>,
    stop_tx: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<()>>,
}

impl TestDaemon {
    fn start(config: ServiceConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("integration_test.sock");
        let clipboard = Arc::new(MockClipboard::new());
        let indicator = Arc::new(MockStatusIndicator::new());
        let daemon = Arc::new(Mutex::new(Daemon::new(
            clipboard.clone(),
            indicator.clone(),
            config,
        )));

        let server = IpcServer::new(&socket_path).unwrap();
        let handler = Arc::new(RequestHandler::new(daemon.clone()));
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(server, handler, async {
            let _ = stop_rx.await;
        }));

        Self {
            _dir: dir,
            socket_path,
            clipboard,
            indicator,
            daemon,
            stop_tx: Some(stop_tx),
            server: Some(server),
        }
    }

    fn client(&self) -> IpcClient {
        IpcClient::new(&self.socket_path)
    }

    async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(server) = self.server.take() {
            server.await.unwrap();
        }
    }
}

fn config(show_seconds: u32, deep_clear: bool) -> ServiceConfig {
    ServiceConfig {
        show_seconds,
        deep_clear,
    }
}

// ============================================================================
// Start / Clear / Status
// ============================================================================

#[tokio::test]
async fn test_start_then_status_reports_countdown() {
    let daemon = TestDaemon::start(config(45, false));
    let client = daemon.client();

    let started = client.start_timer().await.unwrap();
    assert_eq!(started.message, "Clipboard will be cleared in 45s");

    let status = client.status().await.unwrap();
    let data = status.data.unwrap();
    assert_eq!(data.state, Some("counting_down".to_string()));
    assert!(data.remaining_seconds.unwrap() <= 45);
    assert!(data.session_id.is_some());
    assert!(daemon.indicator.is_showing());

    daemon.stop().await;
}

#[tokio::test]
async fn test_countdown_completes_over_ipc() {
    let daemon = TestDaemon::start(config(1, false));
    let mut events = daemon.daemon.lock().await.subscribe();

    daemon.client().start_timer().await.unwrap();

    let cleared = timeout(Duration::from_secs(5), async {
        loop {
            if events.recv().await.unwrap() == ServiceEvent::ClipboardCleared {
                break;
            }
        }
    })
    .await;
    assert!(cleared.is_ok(), "countdown never completed");

    // Clearing happens right after the event
    timeout(Duration::from_secs(2), async {
        while daemon.clipboard.clear_count() == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(daemon.clipboard.clear_count(), 1);

    let status = daemon.client().status().await.unwrap();
    assert_eq!(status.data.unwrap().state, Some("terminated".to_string()));

    daemon.stop().await;
}

#[tokio::test]
async fn test_clear_now_cancels_countdown() {
    let daemon = TestDaemon::start(config(30, true));
    let client = daemon.client();
    let mut events = daemon.daemon.lock().await.subscribe();

    client.start_timer().await.unwrap();
    client.clear_now().await.unwrap();

    assert_eq!(daemon.clipboard.write_count(), DEEP_CLEAR_PASSES + 1);
    assert!(!daemon.indicator.is_showing());

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(seen.contains(&ServiceEvent::Cancelled));
    assert!(!seen.contains(&ServiceEvent::ClipboardCleared));

    daemon.stop().await;
}

#[tokio::test]
async fn test_zero_duration_clears_on_start() {
    let daemon = TestDaemon::start(config(0, false));

    let response = daemon.client().start_timer().await.unwrap();

    assert_eq!(response.message, "Clipboard cleared");
    assert_eq!(daemon.clipboard.clear_count(), 1);
    assert_eq!(daemon.indicator.post_count(), 0);

    daemon.stop().await;
}

#[tokio::test]
async fn test_start_after_clear_starts_new_countdown() {
    let daemon = TestDaemon::start(config(20, false));
    let client = daemon.client();

    let first = client.start_timer().await.unwrap().data.unwrap().session_id;
    client.clear_now().await.unwrap();
    let second = client.start_timer().await.unwrap().data.unwrap().session_id;

    assert_ne!(first, second);
    let status = client.status().await.unwrap();
    assert_eq!(status.data.unwrap().state, Some("counting_down".to_string()));

    daemon.stop().await;
}

// ============================================================================
// Connection handling
// ============================================================================

#[tokio::test]
async fn test_client_without_daemon_fails() {
    let dir = tempfile::tempdir().unwrap();
    let client = IpcClient::new(dir.path().join("absent.sock"));

    let result = client.status().await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_socket_removed_after_shutdown() {
    let daemon = TestDaemon::start(config(45, false));
    let socket_path = daemon.socket_path.clone();
    assert!(socket_path.exists());

    daemon.stop().await;

    assert!(!socket_path.exists());
}
