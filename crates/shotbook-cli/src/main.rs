//! Shotbook CLI
//!
//! Command-line interface for shotbook - camera parameter presets.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use shotbook_core::{Config, Library, PresetDraft, Session, StoreError};

mod commands;
mod output;
mod prompt;

use commands::preset::SettingsArgs;
use output::{Output, OutputFormat};

/// Environment variable holding the log filter, e.g. `debug`
const LOG_ENV: &str = "SHOTBOOK_LOG";

#[derive(Parser)]
#[command(name = "shotbook")]
#[command(about = "Shotbook - Share and browse camera parameter presets")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List presets, newest first
    #[command(alias = "ls")]
    List {
        /// Reload from the database before listing
        #[arg(short, long)]
        refresh: bool,
    },
    /// Show preset details
    Show {
        /// Preset ID
        id: String,
    },
    /// Submit a new preset
    #[command(alias = "add")]
    Submit {
        /// Title (up to 20 characters)
        #[arg(short = 'T', long)]
        title: String,
        /// Explanation of the images (up to 300 characters)
        #[arg(short, long)]
        description: String,
        /// Image path or URI; repeat for more (first one is the thumbnail)
        #[arg(short, long = "image", required = true)]
        images: Vec<String>,
        /// Camera settings as a JSON object
        #[arg(long, value_name = "JSON")]
        settings: Option<String>,
        /// ISO, e.g. 400
        #[arg(long)]
        iso: Option<String>,
        /// Shutter speed, e.g. 1/125
        #[arg(long)]
        shutter: Option<String>,
        /// Aperture, e.g. f/2.8
        #[arg(long)]
        aperture: Option<String>,
        /// White balance, e.g. Daylight
        #[arg(long)]
        white_balance: Option<String>,
        /// Focus mode, e.g. AF-S
        #[arg(long)]
        focus: Option<String>,
        /// Exposure compensation, e.g. +0.3EV
        #[arg(long, allow_hyphen_values = true)]
        ev: Option<String>,
    },
    /// Edit the title or description of a preset
    Edit {
        /// Preset ID
        id: String,
        /// New title
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a preset
    #[command(alias = "rm")]
    Delete {
        /// Preset ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete every preset and restore the samples
    Reinit {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Log in with phone number and verification code
    Login {
        /// 11-digit phone number
        phone: String,
        /// 6-digit verification code
        code: String,
    },
    /// Log out
    Logout,
    /// Show who new submissions are credited to
    Whoami,
    /// List selectable camera setting values
    Options {
        /// Which list (iso, shutter, aperture, white-balance, focus, exposure, filter)
        name: Option<String>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show status (storage, counts, session)
    Status,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, max_images, backfill_on_fallback, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Commands that don't need the database
    match &cli.command {
        Commands::Config { command } => {
            return match command.clone() {
                Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
                Some(ConfigCommands::Set { key, value }) => {
                    commands::config::set(key, value, config_path, &output)
                }
            };
        }
        Commands::Options { name } => return commands::options::show(name.clone(), &output),
        _ => {}
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    let mut session = Session::load(&config)?;

    match &cli.command {
        Commands::Login { phone, code } => {
            return commands::session::login(&mut session, phone.clone(), code.clone(), &output);
        }
        Commands::Logout => return commands::session::logout(&mut session, &output),
        Commands::Whoami => return commands::session::whoami(&session, &output),
        _ => {}
    }

    let library = open_library(config).await?;

    match cli.command {
        Commands::List { refresh } => commands::preset::list(&library, refresh, &output).await,
        Commands::Show { id } => commands::preset::show(&library, id, &output).await,
        Commands::Submit {
            title,
            description,
            images,
            settings,
            iso,
            shutter,
            aperture,
            white_balance,
            focus,
            ev,
        } => {
            let settings = SettingsArgs {
                json: settings,
                iso,
                shutter,
                aperture,
                white_balance,
                focus,
                ev,
            }
            .into_settings()?;
            let draft = PresetDraft::new(title, description, images, settings);
            commands::preset::submit(&library, &session, draft, &output).await
        }
        Commands::Edit {
            id,
            title,
            description,
        } => commands::preset::edit(&library, id, title, description, &output).await,
        Commands::Delete { id, yes } => {
            commands::preset::delete(&library, id, yes, &output).await
        }
        Commands::Reinit { yes } => commands::preset::reinit(&library, yes, &output).await,
        Commands::Status => commands::status::show(&library, &session, &output).await,
        Commands::Config { .. }
        | Commands::Options { .. }
        | Commands::Login { .. }
        | Commands::Logout
        | Commands::Whoami => unreachable!(), // Handled above
    }
}

/// Open the database and load presets, explaining startup failures
async fn open_library(config: Config) -> Result<Library> {
    let data_dir = config.data_dir.clone();
    match Library::open(config).await {
        Ok(library) => {
            debug!(
                data_dir = %data_dir.display(),
                presets = library.list().len(),
                "Opened preset library"
            );
            Ok(library)
        }
        Err(e) => {
            error!(
                data_dir = %data_dir.display(),
                error = %e,
                recoverable = e.is_recoverable(),
                "Failed to open preset library"
            );
            if let Some(hint) = e.recovery_suggestion() {
                eprintln!("{}", hint);
            }
            if let StoreError::Codec(ref codec) = e {
                eprintln!("Corrupt preset: {}", codec.preset_id());
            }
            Err(e).context("Failed to open preset library")
        }
    }
}

/// Log to stderr when SHOTBOOK_LOG is set
fn init_logging() {
    let Ok(filter) = std::env::var(LOG_ENV) else {
        return;
    };

    let env_filter = if filter.contains('=') {
        EnvFilter::new(filter)
    } else {
        EnvFilter::new(format!("shotbook_core={},shotbook={}", filter, filter))
    };

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .try_init();
}
