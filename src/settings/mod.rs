//! Persistent application settings.
//!
//! Settings live in `~/.passclip/settings.json`. Every field has a serde
//! default so a partial or missing file still yields a usable value.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::DEFAULT_SHOW_TIME_SECONDS;

/// Directory (under the home directory) holding all passclip files.
const APP_DIR_NAME: &str = ".passclip";

/// Settings file name.
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Errors raised while reading or writing the settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The home directory could not be determined
    #[error("Could not determine the home directory")]
    NoHomeDir,

    /// Reading or writing the file failed
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON for the settings schema
    #[error("Invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_show_time() -> String {
    DEFAULT_SHOW_TIME_SECONDS.to_string()
}

fn default_database() -> PathBuf {
    app_dir().join("stores.sqlite")
}

fn default_socket_path() -> PathBuf {
    app_dir().join("passclip.sock")
}

/// Returns `~/.passclip`, falling back to `./.passclip` without a home.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// User settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Seconds a copied secret stays on the clipboard, string-encoded.
    #[serde(default = "default_show_time")]
    pub general_show_time: String,

    /// Overwrite the clipboard repeatedly instead of once.
    #[serde(default)]
    pub clear_clipboard_20x: bool,

    /// Store database location.
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Daemon socket location.
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general_show_time: default_show_time(),
            clear_clipboard_20x: false,
            database: default_database(),
            socket_path: default_socket_path(),
        }
    }
}

impl Settings {
    /// Default settings file path.
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        let home = dirs::home_dir().ok_or(SettingsError::NoHomeDir)?;
        Ok(home.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    /// Reads settings from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn read_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            debug!("Settings file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Loads settings from the default location.
    ///
    /// Never fails: a missing or corrupt file yields defaults.
    pub fn load() -> Self {
        match Self::default_path() {
            Ok(path) => Self::load_or_default(&path),
            Err(e) => {
                warn!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    /// Loads settings from `path`, logging and falling back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        Self::read_from(path).unwrap_or_else(|e| {
            warn!("Failed to load settings from {:?}: {}", path, e);
            Self::default()
        })
    }

    /// Writes settings to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Parsed show duration.
    ///
    /// Malformed values (non-numeric, negative, overflowing) fall back to
    /// the default of 45 seconds without surfacing an error.
    pub fn show_time_seconds(&self) -> u32 {
        parse_show_time(&self.general_show_time)
    }

    /// Whether deep clearing is enabled.
    pub fn deep_clear(&self) -> bool {
        self.clear_clipboard_20x
    }
}

/// Parses a string-encoded duration, defaulting to 45 on failure.
pub fn parse_show_time(raw: &str) -> u32 {
    raw.trim().parse::<u32>().unwrap_or_else(|_| {
        debug!(
            "Invalid show time {:?}, defaulting to {}s",
            raw, DEFAULT_SHOW_TIME_SECONDS
        );
        DEFAULT_SHOW_TIME_SECONDS
    })
}
