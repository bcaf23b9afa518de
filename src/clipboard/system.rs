//! System clipboard backed by the platform's clipboard tool.
//!
//! Supported tools, in probe order:
//! - macOS: `pbcopy`
//! - Wayland: `wl-copy`
//! - X11: `xclip`, then `xsel`

use std::io::Write;
use std::process::{Command, Stdio};

use crate::platform::find_in_path;

use super::error::ClipboardError;
use super::ClipboardAccess;

/// A command-line clipboard writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardTool {
    Pbcopy,
    WlCopy,
    Xclip,
    Xsel,
}

impl ClipboardTool {
    /// Probe order for [`ClipboardTool::detect`].
    const ALL: [ClipboardTool; 4] = [
        ClipboardTool::Pbcopy,
        ClipboardTool::WlCopy,
        ClipboardTool::Xclip,
        ClipboardTool::Xsel,
    ];

    /// Executable name.
    pub fn program(&self) -> &'static str {
        match self {
            ClipboardTool::Pbcopy => "pbcopy",
            ClipboardTool::WlCopy => "wl-copy",
            ClipboardTool::Xclip => "xclip",
            ClipboardTool::Xsel => "xsel",
        }
    }

    /// Arguments that make the tool read the new contents from stdin.
    pub fn args(&self) -> &'static [&'static str] {
        match self {
            ClipboardTool::Pbcopy | ClipboardTool::WlCopy => &[],
            ClipboardTool::Xclip => &["-selection", "clipboard"],
            ClipboardTool::Xsel => &["--clipboard", "--input"],
        }
    }

    /// Returns the first tool found on `PATH`.
    pub fn detect() -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tool| find_in_path(tool.program()).is_some())
    }
}

/// Clipboard writer that pipes text into a platform tool.
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    tool: Option<ClipboardTool>,
}

impl SystemClipboard {
    /// Detects the platform tool. The clipboard is unavailable if none is found.
    #[must_use]
    pub fn new() -> Self {
        let tool = ClipboardTool::detect();
        match tool {
            Some(t) => tracing::debug!("Using clipboard tool: {}", t.program()),
            None => tracing::debug!("No clipboard tool found on PATH"),
        }
        Self { tool }
    }

    /// Uses a specific tool without probing.
    #[must_use]
    pub fn with_tool(tool: ClipboardTool) -> Self {
        Self { tool: Some(tool) }
    }

    /// Returns the selected tool.
    pub fn tool(&self) -> Option<ClipboardTool> {
        self.tool
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardAccess for SystemClipboard {
    fn write(&self, text: &str) -> Result<(), ClipboardError> {
        let tool = self.tool.ok_or(ClipboardError::Unavailable)?;

        // wl-copy refuses empty stdin; it has a dedicated flag instead
        let mut command = Command::new(tool.program());
        if tool == ClipboardTool::WlCopy && text.is_empty() {
            command.arg("--clear");
        } else {
            command.args(tool.args());
        }

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ClipboardError::SpawnFailed(tool.program().to_string(), e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| ClipboardError::WriteFailed(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| ClipboardError::WriteFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClipboardError::WriteFailed(stderr.trim().to_string()));
        }

        Ok(())
    }

    fn is_available(&self) -> bool {
        self.tool.is_some()
    }
}
