//! IPC server for the clipboard daemon.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for `start-timer`, `clear-now` and `status`
//! - The accept loop that dispatches connections to the [`Daemon`] host

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, Mutex};
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use crate::types::{IpcRequest, IpcResponse, ResponseData};

use super::host::Daemon;

// ============================================================================
// Constants
// ============================================================================

/// Maximum request size in bytes (4KB)
pub const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Socket binding error
    #[error("Failed to bind socket {0:?}: {1}")]
    BindError(PathBuf, String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The peer closed the connection before sending a request
    #[error("Connection closed by client")]
    ConnectionClosed,

    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Write error
    #[error("Failed to write response: {0}")]
    WriteError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Binds a server to `socket_path`, replacing any stale socket file.
    ///
    /// # Errors
    ///
    /// Returns `BindError` if the directory cannot be created or the socket
    /// cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self, IpcError> {
        let bind_error = |e: std::io::Error| IpcError::BindError(socket_path.to_path_buf(), e.to_string());

        if socket_path.exists() {
            std::fs::remove_file(socket_path).map_err(bind_error)?;
        }
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).map_err(bind_error)?;
        }

        let listener = UnixListener::bind(socket_path).map_err(bind_error)?;
        debug!("IPC server listening on {:?}", socket_path);

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream, IpcError> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .map_err(|e| IpcError::ConnectionError(e.to_string()))?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Reads until the client shuts down its write side, so a request may
    /// arrive in any number of pieces. The whole read is bounded by a
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if reading times out, the payload exceeds
    /// [`MAX_REQUEST_SIZE`], or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest, IpcError> {
        let mut buffer = Vec::with_capacity(1024);

        // One spare byte detects oversized payloads
        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            (&mut *stream)
                .take(MAX_REQUEST_SIZE as u64 + 1)
                .read_to_end(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string())),
            Err(_) => return Err(IpcError::Timeout),
        };

        if n == 0 {
            return Err(IpcError::ConnectionClosed);
        }
        if n > MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge);
        }

        serde_json::from_slice(&buffer).map_err(|e| IpcError::SerializationError(e.to_string()))
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(
        stream: &mut UnixStream,
        response: &IpcResponse,
    ) -> Result<(), IpcError> {
        let json =
            serde_json::to_vec(response).map_err(|e| IpcError::SerializationError(e.to_string()))?;

        stream
            .write_all(&json)
            .await
            .map_err(|e| IpcError::WriteError(e.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|e| IpcError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        // Clean up socket file on drop
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the daemon host.
pub struct RequestHandler {
    /// Shared reference to the daemon host
    daemon: Arc<Mutex<Daemon>>,
}

impl RequestHandler {
    /// Creates a new request handler for the given daemon.
    pub fn new(daemon: Arc<Mutex<Daemon>>) -> Self {
        Self { daemon }
    }

    /// Handles an IPC request and returns the appropriate response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        match request {
            IpcRequest::StartTimer => self.handle_start_timer().await,
            IpcRequest::ClearNow => self.handle_clear_now().await,
            IpcRequest::Status => self.handle_status().await,
        }
    }

    /// Handles the start-timer command.
    async fn handle_start_timer(&self) -> IpcResponse {
        let mut daemon = self.daemon.lock().await;

        match daemon.start_timer().await {
            Ok(session) => {
                let message = if session.show_seconds == 0 {
                    "Clipboard cleared".to_string()
                } else {
                    format!("Clipboard will be cleared in {}s", session.show_seconds)
                };
                IpcResponse::success(message, Some(daemon.status()))
            }
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    /// Handles the clear-now command.
    async fn handle_clear_now(&self) -> IpcResponse {
        let mut daemon = self.daemon.lock().await;

        match daemon.clear_now().await {
            Ok(()) => IpcResponse::success("Clipboard cleared", Some(daemon.status())),
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    /// Handles the status command.
    async fn handle_status(&self) -> IpcResponse {
        let daemon = self.daemon.lock().await;
        let data: ResponseData = daemon.status();
        IpcResponse::success("", Some(data))
    }

    /// Reads one request from `stream`, answers it and closes.
    pub async fn handle_connection(&self, mut stream: UnixStream) {
        let response = match IpcServer::receive_request(&mut stream).await {
            Ok(request) => {
                debug!("IPC request: {:?}", request);
                self.handle(request).await
            }
            Err(IpcError::ConnectionClosed) => return,
            Err(e) => {
                warn!("Rejected IPC request: {}", e);
                IpcResponse::error(e.to_string())
            }
        };

        if let Err(e) = IpcServer::send_response(&mut stream, &response).await {
            warn!("{}", e);
        }
    }
}

// ============================================================================
// Accept loop
// ============================================================================

/// Serves connections until `shutdown` resolves.
///
/// Each connection is handled on its own task so a slow client cannot
/// stall the others.
pub async fn serve<F>(server: IpcServer, handler: Arc<RequestHandler>, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                debug!("IPC server shutting down");
                break;
            }
            accepted = server.accept() => match accepted {
                Ok(stream) => {
                    let handler = Arc::clone(&handler);
                    tokio::spawn(async move {
                        handler.handle_connection(stream).await;
                    });
                }
                Err(e) => warn!("{}", e),
            }
        }
    }
}

/// Handles commands that reach the daemon without a socket connection,
/// such as a tapped notification, until every sender is gone.
pub async fn dispatch_actions(
    mut actions: mpsc::UnboundedReceiver<IpcRequest>,
    handler: Arc<RequestHandler>,
) {
    while let Some(request) = actions.recv().await {
        debug!("Notification request: {:?}", request);
        let response = handler.handle(request).await;
        if !response.is_success() {
            warn!("Notification request failed: {}", response.message);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
