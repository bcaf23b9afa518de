//! passclip library
//!
//! Core functionality behind the `passclip` CLI:
//! - Clipboard-clear timer service and the daemon that hosts it
//! - IPC server/client for daemon-CLI communication
//! - Clipboard and status-indicator backends behind traits
//! - Store registry with live queries on SQLite
//! - Settings file and shared type definitions

pub mod cli;
pub mod clipboard;
pub mod daemon;
pub mod indicator;
pub mod platform;
pub mod settings;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{IpcRequest, IpcResponse, ResponseData, ServicePhase, TimerSession};

pub use clipboard::{
    clear_clipboard, ClearMode, ClipboardAccess, ClipboardError, MockClipboard, SystemClipboard,
};

pub use indicator::{
    DesktopIndicator, IndicatorError, MockStatusIndicator, StatusIndicator, StatusNotification,
};

pub use daemon::{ClipboardService, Daemon, ServiceConfig, ServiceError, ServiceEvent};

pub use settings::{Settings, SettingsError};

pub use store::{LiveQuery, SqliteStoreDao, Store, StoreDao, StoreDatabase, StoreError};
