//! passclip - clears copied secrets from the clipboard and keeps a registry
//! of password stores.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use passclip::cli::{store_cmd, Cli, Commands, ConfigCommand, Display, IpcClient};
use passclip::settings::Settings;
use passclip::store::{SqliteStoreDao, StoreDatabase};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Settings file path, honoring `PASSCLIP_SETTINGS` for tests and
/// alternate profiles.
fn settings_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os("PASSCLIP_SETTINGS") {
        return Ok(PathBuf::from(path));
    }
    Ok(Settings::default_path()?)
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        // No command provided, show help
        Cli::command().print_help()?;
        return Ok(());
    };

    let path = settings_path()?;
    let settings = Settings::load_or_default(&path);
    tracing::debug!("Using settings {:?}", path);

    match command {
        Commands::Daemon => {
            passclip::daemon::run(settings, path).await?;
        }
        Commands::Start => {
            let response = IpcClient::new(&settings.socket_path).start_timer().await?;
            Display::show_start_success(&response);
        }
        Commands::Clear => {
            let response = IpcClient::new(&settings.socket_path).clear_now().await?;
            Display::show_clear_success(&response);
        }
        Commands::Status => {
            let response = IpcClient::new(&settings.socket_path).status().await?;
            Display::show_status(&response);
        }
        Commands::Config(command) => run_config(settings, &path, command)?,
        Commands::Store(command) => {
            let db = StoreDatabase::open(&settings.database).with_context(|| {
                format!("Failed to open store database {:?}", settings.database)
            })?;
            store_cmd::run(&SqliteStoreDao::new(db), command).await?;
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

/// Executes a `config` subcommand.
fn run_config(mut settings: Settings, path: &std::path::Path, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            Display::show_settings(&settings);
            return Ok(());
        }
        ConfigCommand::SetShowTime { value } => {
            settings.general_show_time = value;
        }
        ConfigCommand::SetDeepClear { enabled } => {
            settings.clear_clipboard_20x = enabled;
        }
    }
    settings
        .save_to(path)
        .with_context(|| format!("Failed to write settings to {:?}", path))?;
    Display::show_settings(&settings);
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
