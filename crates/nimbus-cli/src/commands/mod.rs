//! CLI subcommands
//!
//! Every command takes a [`CommandContext`] carrying the output format, the
//! loaded configuration and the global authentication flags. Remote commands
//! authenticate through [`crate::auth::connect`] first; an authentication
//! failure is fatal, while a failed operation is reported and the command
//! still exits cleanly.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use nimbus_core::config::Config;
use nimbus_core::domain::{RemoteEntry, RemotePath};
use nimbus_core::usecases::RemoteOperations;

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

pub mod config;
pub mod files;
pub mod login;
pub mod mirror;
pub mod transfer;
pub mod watch;

/// Authentication flags shared by every command
#[derive(Debug, Clone, Default, Args)]
pub struct AuthArgs {
    /// Service domain (default from config)
    #[arg(long, global = true)]
    pub domain: Option<String>,

    /// Account email
    #[arg(long, global = true)]
    pub email: Option<String>,

    /// Account password (prompted when --email is given without it)
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Session file to load and save
    #[arg(long, global = true)]
    pub session: Option<PathBuf>,
}

/// State shared by every command invocation
pub struct CommandContext {
    pub format: OutputFormat,
    pub config: Config,
    pub config_path: PathBuf,
    pub auth: AuthArgs,
}

impl CommandContext {
    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.format)
    }

    /// Authenticates and wraps the storage in [`RemoteOperations`]
    pub async fn remote_operations(&self) -> Result<RemoteOperations> {
        let (storage, _session) = crate::auth::connect(&self.auth, &self.config).await?;
        Ok(RemoteOperations::new(storage))
    }
}

/// Parses a remote path argument, accepting relative and slash-heavy input
pub fn remote_path(raw: &str) -> Result<RemotePath> {
    RemotePath::parse(raw).with_context(|| format!("Invalid remote path '{raw}'"))
}

/// One listing row: kind, id and full path
pub fn entry_row(entry: &RemoteEntry) -> String {
    let full = entry
        .full_path()
        .map(|p| p.to_string())
        .unwrap_or_else(|_| format!("{}{}", entry.path, entry.name));
    format!("{:<6} {:<24} {}", entry.kind.to_string(), entry.object_id.as_str(), full)
}

/// JSON form of a remote entry with its full path
pub fn entry_json(entry: &RemoteEntry) -> serde_json::Value {
    serde_json::json!({
        "name": entry.name,
        "path": entry.full_path().ok().map(|p| p.to_string()),
        "id": entry.object_id.to_string(),
        "kind": entry.kind.to_string(),
    })
}
