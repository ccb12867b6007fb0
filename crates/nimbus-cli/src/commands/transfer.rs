//! Transfer commands - Download and upload single files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use nimbus_core::domain::RemotePath;
use tracing::info;

use super::{entry_json, remote_path, CommandContext};

/// Download one remote file
#[derive(Debug, Args)]
pub struct GetCommand {
    /// Remote file to download
    pub remote: String,

    /// Local file to write (default: the remote name in the current directory)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

impl GetCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = ctx.formatter();
        let remote = remote_path(&self.remote)?;
        let out = match &self.out {
            Some(out) => out.clone(),
            None => default_output(&remote)?,
        };
        let ops = ctx.remote_operations().await?;

        let data = match ops.get_file(&remote).await {
            Ok(data) => data,
            Err(e) => {
                formatter.error(&format!("Failed to download {remote}: {e}"));
                return Ok(());
            }
        };

        if let Err(e) = tokio::fs::write(&out, &data).await {
            formatter.error(&format!("Failed to write {}: {e}", out.display()));
            return Ok(());
        }
        info!(remote = %remote, local = %out.display(), bytes = data.len(), "Downloaded file");

        if ctx.format.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "remote": remote.to_string(),
                "local": out.display().to_string(),
                "bytes": data.len(),
            }));
        } else {
            formatter.success(&format!(
                "Downloaded {} to {} ({} bytes)",
                remote,
                out.display(),
                data.len()
            ));
        }
        Ok(())
    }
}

/// Local file name for a download when `--out` is not given
fn default_output(remote: &RemotePath) -> Result<PathBuf> {
    remote
        .file_name()
        .map(PathBuf::from)
        .with_context(|| format!("Cannot derive a local name from {remote}, use --out"))
}

/// Upload a local file into a remote folder
#[derive(Debug, Args)]
pub struct PutCommand {
    /// Local file to upload
    pub local: PathBuf,

    /// Remote folder to upload into
    pub remote_dir: String,
}

impl PutCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = ctx.formatter();
        let remote_dir = remote_path(&self.remote_dir)?;
        if !is_regular_file(&self.local) {
            formatter.error(&format!("{} is not a readable file", self.local.display()));
            return Ok(());
        }
        let ops = ctx.remote_operations().await?;

        match ops.create_file(&remote_dir, &self.local).await {
            Ok(entry) if ctx.format.is_json() => {
                formatter.print_json(&serde_json::json!({ "success": true, "entry": entry_json(&entry) }));
            }
            Ok(entry) => formatter.success(&format!(
                "Uploaded {} to {}{}",
                self.local.display(),
                remote_dir.as_container(),
                entry.name
            )),
            Err(e) => formatter.error(&format!(
                "Failed to upload {}: {e}",
                self.local.display()
            )),
        }

        Ok(())
    }
}

fn is_regular_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}
