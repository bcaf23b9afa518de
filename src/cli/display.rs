//! Display utilities for the passclip CLI.
//!
//! Formatting lives in `format_*` functions that return strings so tests
//! can check the output; the `show_*` functions print them.

use std::fmt::Write as _;

use crate::settings::Settings;
use crate::store::Store;
use crate::types::IpcResponse;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the daemon's reply to `start`.
    pub fn show_start_success(response: &IpcResponse) {
        println!("* {}", response.message);
    }

    /// Shows the daemon's reply to `clear`.
    pub fn show_clear_success(_response: &IpcResponse) {
        println!("* Clipboard cleared");
    }

    /// Shows the countdown status.
    pub fn show_status(response: &IpcResponse) {
        print!("{}", Self::format_status(response));
    }

    /// Shows the settings file contents.
    pub fn show_settings(settings: &Settings) {
        print!("{}", Self::format_settings(settings));
    }

    /// Shows a list of stores as a table.
    pub fn show_stores(stores: &[Store]) {
        print!("{}", Self::format_stores(stores));
    }

    /// Shows a single store.
    pub fn show_store(store: &Store) {
        print!("{}", Self::format_stores(std::slice::from_ref(store)));
    }

    /// Shows a one-line confirmation.
    pub fn show_done(message: &str) {
        println!("* {}", message);
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    pub fn format_status(response: &IpcResponse) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "passclip status");
        let _ = writeln!(out, "───────────────");

        let Some(data) = &response.data else {
            let _ = writeln!(out, "The daemon reported no status");
            return out;
        };

        let state = data.state.as_deref().unwrap_or("unknown");
        let state_display = match state {
            "idle" => "idle",
            "counting_down" => "counting down",
            "terminated" => "cleared",
            other => other,
        };
        let _ = writeln!(out, "State: {}", state_display);

        if state == "counting_down" {
            if let Some(remaining) = data.remaining_seconds {
                let (minutes, seconds) = Self::format_time(remaining);
                let _ = writeln!(out, "Clears in: {}:{:02}", minutes, seconds);
            }
        }
        out
    }

    pub fn format_settings(settings: &Settings) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "general_show_time   = {:?} ({}s)",
            settings.general_show_time,
            settings.show_time_seconds()
        );
        let _ = writeln!(out, "clear_clipboard_20x = {}", settings.clear_clipboard_20x);
        let _ = writeln!(out, "database            = {}", settings.database.display());
        let _ = writeln!(out, "socket_path         = {}", settings.socket_path.display());
        out
    }

    pub fn format_stores(stores: &[Store]) -> String {
        if stores.is_empty() {
            return "No stores\n".to_string();
        }

        let name_width = stores
            .iter()
            .map(|s| s.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("NAME".len());

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:>6}  {:<name_width$}  {:<8}  {}",
            "ID", "NAME", "EXTERNAL", "INITIALIZED"
        );
        for store in stores {
            let _ = writeln!(
                out,
                "{:>6}  {:<name_width$}  {:<8}  {}",
                store.id,
                store.name,
                yes_no(store.external),
                yes_no(store.initialized)
            );
        }
        out
    }

    /// Formats remaining seconds as (minutes, seconds).
    fn format_time(total_seconds: u32) -> (u32, u32) {
        (total_seconds / 60, total_seconds % 60)
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

// ============================================================================
// Tests
// ============================================================================
