//! Remote file management commands: ls, mkdir, mv, rm
//!
//! Each command authenticates, runs one [`RemoteOperations`] call and
//! reports the outcome. A failed operation is printed as an error and the
//! command still returns `Ok`.
//!
//! [`RemoteOperations`]: nimbus_core::usecases::RemoteOperations

use anyhow::Result;
use clap::Args;

use super::{entry_json, entry_row, remote_path, CommandContext};

/// List the children of a remote folder
#[derive(Debug, Args)]
pub struct LsCommand {
    /// Remote folder (default: root)
    #[arg(default_value = "/")]
    pub path: String,
}

impl LsCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = ctx.formatter();
        let path = remote_path(&self.path)?;
        let ops = ctx.remote_operations().await?;

        match ops.list(&path).await {
            Ok(entries) if ctx.format.is_json() => {
                let entries: Vec<_> = entries.iter().map(entry_json).collect();
                formatter.print_json(&serde_json::json!({ "path": path.to_string(), "entries": entries }));
            }
            Ok(entries) => {
                for entry in &entries {
                    formatter.line(&entry_row(entry));
                }
                formatter.info(&format!("{} entries in {}", entries.len(), path));
            }
            Err(e) => formatter.error(&format!("Failed to list {path}: {e}")),
        }

        Ok(())
    }
}

/// Create a remote folder
#[derive(Debug, Args)]
pub struct MkdirCommand {
    /// Remote folder to create
    pub path: String,
}

impl MkdirCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = ctx.formatter();
        let path = remote_path(&self.path)?;
        let ops = ctx.remote_operations().await?;

        match ops.create_dir(&path).await {
            Ok(entry) if ctx.format.is_json() => {
                formatter.print_json(&serde_json::json!({ "success": true, "entry": entry_json(&entry) }));
            }
            Ok(entry) => formatter.success(&format!("Created {} ({})", path, entry.object_id)),
            Err(e) => formatter.error(&format!("Failed to create {path}: {e}")),
        }

        Ok(())
    }
}

/// Move a remote entry into another folder
#[derive(Debug, Args)]
pub struct MvCommand {
    /// Entry to move
    pub source: String,

    /// Destination folder
    pub dest_dir: String,

    /// New name at the destination (default: keep the current name)
    #[arg(long)]
    pub name: Option<String>,
}

impl MvCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = ctx.formatter();
        let source = remote_path(&self.source)?;
        let dest_dir = remote_path(&self.dest_dir)?;
        let ops = ctx.remote_operations().await?;

        match ops.move_entry(&source, &dest_dir, self.name.as_deref()).await {
            Ok(()) => formatter.success(&format!("Moved {source} into {dest_dir}")),
            Err(e) => formatter.error(&format!("Failed to move {source}: {e}")),
        }

        Ok(())
    }
}

/// Move remote entries to the recycle bin
#[derive(Debug, Args)]
pub struct RmCommand {
    /// Entries to recycle
    #[arg(required = true)]
    pub paths: Vec<String>,
}

impl RmCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = ctx.formatter();
        let paths = self
            .paths
            .iter()
            .map(|p| remote_path(p))
            .collect::<Result<Vec<_>>>()?;
        let ops = ctx.remote_operations().await?;

        match ops.delete(&paths).await {
            Ok(count) => {
                formatter.success(&format!("Recycled {count} of {} entries", paths.len()));
                if count < paths.len() {
                    formatter.warn("Some paths could not be found and were skipped");
                }
            }
            Err(e) => formatter.error(&format!("Failed to recycle: {e}")),
        }

        Ok(())
    }
}
