//! Nimbus CLI - Command-line client for a cloud drive
//!
//! Provides commands for:
//! - Mirroring a remote folder tree onto local disk
//! - Logging changes under a local directory
//! - Single-shot remote operations (list, get, put, mkdir, move, recycle)
//! - Logging in and persisting a session
//! - Inspecting configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nimbus_core::config::Config;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod auth;
mod commands;
mod output;

use commands::{
    config::ConfigCommand,
    files::{LsCommand, MkdirCommand, MvCommand, RmCommand},
    login::LoginCommand,
    mirror::{MirrorCommand, TreeCommand},
    transfer::{GetCommand, PutCommand},
    watch::WatchCommand,
    AuthArgs, CommandContext,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "nimbus", version, about = "Cloud drive mirror and change logger")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    auth: AuthArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Mirror a remote folder tree into a local directory
    Mirror(MirrorCommand),
    /// Print the remote folder tree
    Tree(TreeCommand),
    /// Log every change under a local directory until interrupted
    Watch(WatchCommand),
    /// List the children of a remote folder
    Ls(LsCommand),
    /// Download one remote file
    Get(GetCommand),
    /// Upload a local file into a remote folder
    Put(PutCommand),
    /// Create a remote folder
    Mkdir(MkdirCommand),
    /// Move a remote entry into another folder
    Mv(MvCommand),
    /// Move remote entries to the recycle bin
    Rm(RmCommand),
    /// Authenticate and save the session
    Login(LoginCommand),
    /// View and check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Log level from the flags, falling back to the configured level
fn log_level(debug: bool, verbose: u8, configured: &str) -> String {
    match (debug, verbose) {
        (_, v) if v >= 2 => "trace".to_string(),
        (true, _) | (_, 1) => "debug".to_string(),
        _ => configured.to_string(),
    }
}

/// Loads the named config file strictly, or the default one leniently
fn load_config(explicit: Option<&PathBuf>) -> Result<(Config, PathBuf)> {
    match explicit {
        Some(path) => {
            let config = Config::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            Ok((config, path.clone()))
        }
        None => {
            let path = Config::default_path();
            Ok((Config::load_or_default(&path), path))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_path) = load_config(cli.config.as_ref())?;

    // Setup tracing
    let filter = log_level(cli.debug, cli.verbose, &config.logging.level);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    debug!(config_path = %config_path.display(), "Configuration loaded");

    let ctx = CommandContext {
        format: OutputFormat::from_json_flag(cli.json),
        config,
        config_path,
        auth: cli.auth,
    };

    match cli.command {
        Commands::Mirror(cmd) => cmd.execute(&ctx).await,
        Commands::Tree(cmd) => cmd.execute(&ctx).await,
        Commands::Watch(cmd) => cmd.execute(&ctx).await,
        Commands::Ls(cmd) => cmd.execute(&ctx).await,
        Commands::Get(cmd) => cmd.execute(&ctx).await,
        Commands::Put(cmd) => cmd.execute(&ctx).await,
        Commands::Mkdir(cmd) => cmd.execute(&ctx).await,
        Commands::Mv(cmd) => cmd.execute(&ctx).await,
        Commands::Rm(cmd) => cmd.execute(&ctx).await,
        Commands::Login(cmd) => cmd.execute(&ctx).await,
        Commands::Config(cmd) => cmd.execute(&ctx).await,
    }
}
