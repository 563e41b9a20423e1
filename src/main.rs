//! `GoToApp` command-line entry point
//!
//! Runs the inventory operations directly from a terminal, or serves them as
//! JSON lines on stdin/stdout for a UI shell (`gotoapp serve`).

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use gotoapp::{
    GotoAppError, Session,
    bridge::UiBridge,
    config::{AppConfig, ConfigManager},
    error::get_user_friendly_error,
    icon::IconPayload,
    utils,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "gotoapp", version, about = "Find, search and launch installed applications")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan installed applications and list them
    Scan,
    /// Scan, then list applications whose name contains TERM
    Filter {
        /// Case-insensitive substring
        term: String,
    },
    /// Open an application by its launch path
    Launch {
        /// Launch path as shown by `scan`
        path: String,
    },
    /// Print an icon file as a data URI
    Icon {
        /// Icon container or image file
        path: PathBuf,
    },
    /// Serve UI bridge requests as JSON lines on stdin/stdout
    Serve,
    /// Inspect or reset the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Overwrite the configuration with defaults
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = utils::init_logging(&ConfigManager::data_dir().join("logs"))
        .context("Failed to initialize logging system")?;

    let config = ConfigManager::load().context("Failed to load application configuration")?;

    match cli.command {
        Command::Config { action } => run_config(&action, &config)?,
        Command::Scan => {
            let bridge = open_bridge(config)?;
            let result = bridge.scan_applications();
            if let Some(message) = result.error {
                bail!("No applications found: {message}");
            }
            print_records(&result.records);
        }
        Command::Filter { term } => {
            let bridge = open_bridge(config)?;
            let result = bridge.scan_applications();
            if let Some(message) = result.error {
                bail!("No applications found: {message}");
            }
            print_records(&bridge.filter_applications(&term));
        }
        Command::Launch { path } => {
            let result = open_bridge(config)?.launch_application(&path);
            if !result.ok {
                bail!(
                    "Could not open {path}: {}",
                    result.error.unwrap_or_default()
                );
            }
        }
        Command::Icon { path } => {
            let uri = open_bridge(config)?.resolve_icon_data_uri(IconPayload::Path(path.clone()));
            if uri.is_empty() {
                bail!("No displayable icon in {}", path.display());
            }
            println!("{uri}");
        }
        Command::Serve => {
            let bridge = open_bridge(config)?;
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            bridge
                .serve(stdin.lock(), stdout.lock())
                .map_err(report)
                .context("UI bridge stopped")?;
        }
    }

    info!("GoToApp exiting");
    Ok(())
}

/// Detect the host platform and build the bridge over it
fn open_bridge(config: AppConfig) -> Result<UiBridge> {
    let session = Session::detect(config).map_err(report)?;
    UiBridge::new(Arc::new(session)).map_err(report)
}

fn run_config(action: &ConfigAction, config: &AppConfig) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!(
                "{}",
                serde_json::to_string_pretty(config).context("Failed to render configuration")?
            );
        }
        ConfigAction::Path => println!("{}", ConfigManager::get_config_path().display()),
        ConfigAction::Reset => {
            ConfigManager::save(&AppConfig::default()).map_err(report)?;
            println!("Configuration reset: {}", ConfigManager::get_config_path().display());
        }
    }
    Ok(())
}

fn print_records(records: &[gotoapp::bridge::AppRecordDto]) {
    for record in records {
        let marker = if record.icon.is_some() { '*' } else { ' ' };
        println!("{marker} {:<32} {}", record.name, record.path);
    }
}

/// Log an error, show its user-facing text, and hand it on to `anyhow`
fn report(e: GotoAppError) -> anyhow::Error {
    error!("{e}");
    eprintln!("{}", get_user_friendly_error(&e));
    e.into()
}
