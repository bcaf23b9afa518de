//! CLI module for passclip.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `client`: IPC client for daemon communication
//! - `display`: Output formatting and display logic
//! - `store_cmd`: store registry subcommands

pub mod client;
pub mod commands;
pub mod display;
pub mod store_cmd;

pub use client::IpcClient;
pub use commands::{AddStoreArgs, Cli, Commands, ConfigCommand, ListStoresArgs, StoreCommand};
pub use display::Display;
