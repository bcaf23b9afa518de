//! Command definitions for the passclip CLI.
//!
//! Uses clap derive macro for argument parsing.

use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI Structure
// ============================================================================

/// passclip - clipboard auto-clear daemon and store registry
#[derive(Parser, Debug)]
#[command(
    name = "passclip",
    version,
    about = "Clears copied secrets from the clipboard and manages password stores",
    long_about = "Runs a small daemon that clears the clipboard a configurable number of \n\
                  seconds after a secret was copied, and keeps a registry of password stores.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the clipboard timer daemon in the foreground
    Daemon,

    /// Start the clear countdown
    Start,

    /// Clear the clipboard now and cancel any countdown
    Clear,

    /// Show the countdown status
    Status,

    /// Show or change settings
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Manage registered password stores
    #[command(subcommand)]
    Store(StoreCommand),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// `passclip config ...`
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Print the current settings
    Show,

    /// Set how long a copied secret stays on the clipboard, in seconds
    SetShowTime {
        /// Seconds; values that are not a non-negative integer mean 45
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Overwrite the clipboard 20 times before clearing it
    SetDeepClear {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

/// `passclip store ...`
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    /// Register a store
    Add(AddStoreArgs),

    /// List stores
    List(ListStoresArgs),

    /// Show one store
    Show {
        id: i64,
    },

    /// Rename a store
    Rename {
        id: i64,
        #[arg(value_parser = validate_store_name)]
        name: String,
    },

    /// Mark a store as initialized or not
    SetInitialized {
        id: i64,
        #[arg(action = clap::ArgAction::Set)]
        initialized: bool,
    },

    /// Remove a store from the registry
    Remove {
        id: i64,
    },

    /// Print the store list every time it changes
    Watch,
}

/// Arguments for `store add`
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AddStoreArgs {
    /// Unique store id
    #[arg(long)]
    pub id: i64,

    /// Display name
    #[arg(long, value_parser = validate_store_name)]
    pub name: String,

    /// The store lives outside managed storage
    #[arg(long)]
    pub external: bool,

    /// The store is already set up
    #[arg(long)]
    pub initialized: bool,
}

/// Arguments for `store list`
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
#[group(multiple = false)]
pub struct ListStoresArgs {
    /// Only external stores
    #[arg(long)]
    pub external: bool,

    /// Only initialized stores
    #[arg(long)]
    pub initialized: bool,

    /// Only stores whose name matches a SQL LIKE pattern
    #[arg(long)]
    pub name: Option<String>,
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates a store name.
///
/// - Must not be blank
/// - Must not exceed 100 characters
fn validate_store_name(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("Store name must not be empty".to_string());
    }
    if s.chars().count() > 100 {
        return Err("Store name must be at most 100 characters".to_string());
    }
    Ok(s.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_no_args() {
            let cli = Cli::parse_from(["passclip"]);
            assert!(cli.command.is_none());
            assert!(!cli.verbose);
        }

        #[test]
        fn test_parse_short_verbose_flag() {
            let cli = Cli::parse_from(["passclip", "-v", "status"]);
            assert!(cli.verbose);
            assert!(matches!(cli.command, Some(Commands::Status)));
        }

        #[test]
        fn test_parse_timer_commands() {
            assert!(matches!(
                Cli::parse_from(["passclip", "start"]).command,
                Some(Commands::Start)
            ));
            assert!(matches!(
                Cli::parse_from(["passclip", "clear"]).command,
                Some(Commands::Clear)
            ));
            assert!(matches!(
                Cli::parse_from(["passclip", "daemon"]).command,
                Some(Commands::Daemon)
            ));
        }

        #[test]
        fn test_parse_completions() {
            let cli = Cli::parse_from(["passclip", "completions", "zsh"]);
            assert!(matches!(
                cli.command,
                Some(Commands::Completions {
                    shell: clap_complete::Shell::Zsh
                })
            ));
        }

        #[test]
        fn test_verify_command() {
            use clap::CommandFactory;
            Cli::command().debug_assert();
        }
    }

    mod config_command_tests {
        use super::*;

        #[test]
        fn test_set_show_time_keeps_raw_value() {
            let cli = Cli::parse_from(["passclip", "config", "set-show-time", "abc"]);
            match cli.command {
                Some(Commands::Config(ConfigCommand::SetShowTime { value })) => {
                    assert_eq!(value, "abc");
                }
                other => panic!("Expected set-show-time, got {:?}", other),
            }
        }

        #[test]
        fn test_set_deep_clear() {
            let cli = Cli::parse_from(["passclip", "config", "set-deep-clear", "true"]);
            assert!(matches!(
                cli.command,
                Some(Commands::Config(ConfigCommand::SetDeepClear { enabled: true }))
            ));
        }

        #[test]
        fn test_set_deep_clear_requires_bool() {
            let result = Cli::try_parse_from(["passclip", "config", "set-deep-clear", "maybe"]);
            assert!(result.is_err());
        }
    }

    mod store_command_tests {
        use super::*;

        #[test]
        fn test_parse_add() {
            let cli = Cli::parse_from([
                "passclip", "store", "add", "--id", "3", "--name", "work", "--external",
            ]);
            match cli.command {
                Some(Commands::Store(StoreCommand::Add(args))) => {
                    assert_eq!(args.id, 3);
                    assert_eq!(args.name, "work");
                    assert!(args.external);
                    assert!(!args.initialized);
                }
                other => panic!("Expected store add, got {:?}", other),
            }
        }

        #[test]
        fn test_add_rejects_blank_name() {
            let result =
                Cli::try_parse_from(["passclip", "store", "add", "--id", "1", "--name", "  "]);
            assert!(result.is_err());
        }

        #[test]
        fn test_list_filters_are_exclusive() {
            let ok = Cli::parse_from(["passclip", "store", "list", "--name", "w%"]);
            match ok.command {
                Some(Commands::Store(StoreCommand::List(args))) => {
                    assert_eq!(args.name, Some("w%".to_string()));
                }
                other => panic!("Expected store list, got {:?}", other),
            }

            let conflict =
                Cli::try_parse_from(["passclip", "store", "list", "--external", "--initialized"]);
            assert!(conflict.is_err());
        }

        #[test]
        fn test_parse_set_initialized() {
            let cli = Cli::parse_from(["passclip", "store", "set-initialized", "7", "false"]);
            assert_eq!(
                cli.command.map(|c| match c {
                    Commands::Store(cmd) => Some(cmd),
                    _ => None,
                }),
                Some(Some(StoreCommand::SetInitialized {
                    id: 7,
                    initialized: false
                }))
            );
        }

        #[test]
        fn test_validate_store_name() {
            assert!(validate_store_name("personal").is_ok());
            assert!(validate_store_name("").is_err());
            assert!(validate_store_name(&"x".repeat(101)).is_err());
        }
    }
}
