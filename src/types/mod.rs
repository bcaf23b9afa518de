//! Core data types for the clipboard-clear daemon.
//!
//! This module defines the data structures used for:
//! - Service lifecycle phases
//! - Transient timer sessions
//! - IPC request/response serialization

use serde::{Deserialize, Serialize};

/// Show duration used when the configured value cannot be parsed.
pub const DEFAULT_SHOW_TIME_SECONDS: u32 = 45;

// ============================================================================
// ServicePhase
// ============================================================================

/// Lifecycle phase of a clipboard service instance.
///
/// `Terminated` is absorbing: once reached, the instance is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServicePhase {
    /// No countdown has been started yet
    #[default]
    Idle,
    /// A countdown is running
    CountingDown,
    /// The clipboard was cleared and the service stopped
    Terminated,
}

impl ServicePhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServicePhase::Idle => "idle",
            ServicePhase::CountingDown => "counting_down",
            ServicePhase::Terminated => "terminated",
        }
    }

    /// Returns true if a countdown is running.
    pub fn is_active(&self) -> bool {
        matches!(self, ServicePhase::CountingDown)
    }

    /// Returns true if the service can no longer accept commands.
    pub fn is_terminated(&self) -> bool {
        matches!(self, ServicePhase::Terminated)
    }
}

// ============================================================================
// TimerSession
// ============================================================================

/// In-memory countdown state. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSession {
    /// Session identifier (uuid v4)
    pub id: String,
    /// Configured show duration in seconds
    pub show_seconds: u32,
    /// Seconds elapsed so far
    pub elapsed_seconds: u32,
    /// Whether the countdown is still running
    pub active: bool,
    /// Deep-clear flag captured when the session started
    pub deep_clear: bool,
}

impl TimerSession {
    /// Creates an active session for the given duration.
    pub fn new(show_seconds: u32, deep_clear: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            show_seconds,
            elapsed_seconds: 0,
            active: true,
            deep_clear,
        }
    }

    /// Advances the session by one second.
    ///
    /// Returns true once the configured duration has elapsed.
    pub fn tick(&mut self) -> bool {
        if self.elapsed_seconds < self.show_seconds {
            self.elapsed_seconds += 1;
        }
        self.is_complete()
    }

    /// Returns true if no time is left.
    pub fn is_complete(&self) -> bool {
        self.elapsed_seconds >= self.show_seconds
    }

    /// Seconds left before the clipboard is cleared.
    pub fn remaining_seconds(&self) -> u32 {
        self.show_seconds.saturating_sub(self.elapsed_seconds)
    }

    /// Marks the session as no longer running.
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPC request from client to daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum IpcRequest {
    /// Begin a countdown using the configured duration
    StartTimer,
    /// Cancel any countdown and clear the clipboard now
    ClearNow,
    /// Query the current status
    Status,
}

/// Response data for IPC responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseData {
    /// Current service phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Remaining seconds
    #[serde(rename = "remainingSeconds", skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u32>,
    /// Configured duration of the running session
    #[serde(rename = "showSeconds", skip_serializing_if = "Option::is_none")]
    pub show_seconds: Option<u32>,
    /// Running session id
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ResponseData {
    /// Creates response data from a phase and an optional session.
    pub fn from_session(phase: ServicePhase, session: Option<&TimerSession>) -> Self {
        Self {
            state: Some(phase.as_str().to_string()),
            remaining_seconds: session.map(TimerSession::remaining_seconds),
            show_seconds: session.map(|s| s.show_seconds),
            session_id: session.map(|s| s.id.clone()),
        }
    }
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true for success responses.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod service_phase_tests {
        use super::*;

        #[test]
        fn test_default_is_idle() {
            assert_eq!(ServicePhase::default(), ServicePhase::Idle);
        }

        #[test]
        fn test_as_str() {
            assert_eq!(ServicePhase::Idle.as_str(), "idle");
            assert_eq!(ServicePhase::CountingDown.as_str(), "counting_down");
            assert_eq!(ServicePhase::Terminated.as_str(), "terminated");
        }

        #[test]
        fn test_is_active_and_terminated() {
            assert!(!ServicePhase::Idle.is_active());
            assert!(ServicePhase::CountingDown.is_active());
            assert!(!ServicePhase::Terminated.is_active());
            assert!(ServicePhase::Terminated.is_terminated());
            assert!(!ServicePhase::CountingDown.is_terminated());
        }

        #[test]
        fn test_serialize() {
            let json = serde_json::to_string(&ServicePhase::CountingDown).unwrap();
            assert_eq!(json, "\"counting_down\"");
        }
    }

    mod timer_session_tests {
        use super::*;

        #[test]
        fn test_new_session() {
            let session = TimerSession::new(45, true);
            assert_eq!(session.show_seconds, 45);
            assert_eq!(session.elapsed_seconds, 0);
            assert!(session.active);
            assert!(session.deep_clear);
            assert_eq!(session.remaining_seconds(), 45);
            assert!(!session.id.is_empty());
        }

        #[test]
        fn test_sessions_get_distinct_ids() {
            let a = TimerSession::new(1, false);
            let b = TimerSession::new(1, false);
            assert_ne!(a.id, b.id);
        }

        #[test]
        fn test_tick_until_complete() {
            let mut session = TimerSession::new(2, false);

            assert!(!session.tick());
            assert_eq!(session.remaining_seconds(), 1);

            assert!(session.tick());
            assert_eq!(session.remaining_seconds(), 0);

            // Saturates
            assert!(session.tick());
            assert_eq!(session.elapsed_seconds, 2);
        }

        #[test]
        fn test_zero_duration_is_complete() {
            let session = TimerSession::new(0, false);
            assert!(session.is_complete());
            assert_eq!(session.remaining_seconds(), 0);
        }

        #[test]
        fn test_deactivate() {
            let mut session = TimerSession::new(10, false);
            session.deactivate();
            assert!(!session.active);
        }
    }

    mod ipc_tests {
        use super::*;

        #[test]
        fn test_request_serialize() {
            assert_eq!(
                serde_json::to_string(&IpcRequest::StartTimer).unwrap(),
                r#"{"command":"start-timer"}"#
            );
            assert_eq!(
                serde_json::to_string(&IpcRequest::ClearNow).unwrap(),
                r#"{"command":"clear-now"}"#
            );
            assert_eq!(
                serde_json::to_string(&IpcRequest::Status).unwrap(),
                r#"{"command":"status"}"#
            );
        }

        #[test]
        fn test_request_deserialize_all_commands() {
            let commands = vec![
                (r#"{"command":"start-timer"}"#, IpcRequest::StartTimer),
                (r#"{"command":"clear-now"}"#, IpcRequest::ClearNow),
                (r#"{"command":"status"}"#, IpcRequest::Status),
            ];

            for (json, expected) in commands {
                let request: IpcRequest = serde_json::from_str(json).unwrap();
                assert_eq!(request, expected, "json: {}", json);
            }
        }

        #[test]
        fn test_request_unknown_command() {
            let result = serde_json::from_str::<IpcRequest>(r#"{"command":"pause"}"#);
            assert!(result.is_err());
        }

        #[test]
        fn test_response_data_from_session() {
            let mut session = TimerSession::new(30, false);
            session.tick();

            let data = ResponseData::from_session(ServicePhase::CountingDown, Some(&session));

            assert_eq!(data.state, Some("counting_down".to_string()));
            assert_eq!(data.remaining_seconds, Some(29));
            assert_eq!(data.show_seconds, Some(30));
            assert_eq!(data.session_id, Some(session.id.clone()));
        }

        #[test]
        fn test_response_data_without_session() {
            let data = ResponseData::from_session(ServicePhase::Idle, None);
            assert_eq!(data.state, Some("idle".to_string()));
            assert!(data.remaining_seconds.is_none());

            let json = serde_json::to_string(&data).unwrap();
            assert!(!json.contains("remainingSeconds"));
        }

        #[test]
        fn test_response_constructors() {
            let ok = IpcResponse::success("started", None);
            assert!(ok.is_success());
            assert_eq!(ok.message, "started");

            let err = IpcResponse::error("boom");
            assert!(!err.is_success());
            assert_eq!(err.status, "error");
            assert!(err.data.is_none());
        }

        #[test]
        fn test_response_deserialize() {
            let json = r#"{"status":"success","message":"OK","data":{"state":"counting_down","remainingSeconds":12}}"#;
            let response: IpcResponse = serde_json::from_str(json).unwrap();

            let data = response.data.unwrap();
            assert_eq!(data.state, Some("counting_down".to_string()));
            assert_eq!(data.remaining_seconds, Some(12));
        }
    }
}
