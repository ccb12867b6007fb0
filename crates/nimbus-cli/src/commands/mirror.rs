//! Mirror and tree commands - Walk the remote hierarchy
//!
//! `nimbus mirror` lists the remote tree breadth-first and then recreates
//! it under a local directory. `nimbus tree` stops after the listing and
//! prints what it found.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use nimbus_core::domain::MirrorTree;
use nimbus_core::usecases::{MaterializeReport, MirrorTreeUseCase};
use tracing::info;

use super::{remote_path, CommandContext};

/// Mirror a remote folder into a local directory
#[derive(Debug, Args)]
pub struct MirrorCommand {
    /// Remote folder to mirror (default from config)
    pub root: Option<String>,

    /// Local directory to mirror into (default from config)
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// Stop listing after this many entries
    #[arg(long)]
    pub max_entries: Option<usize>,
}

impl MirrorCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = ctx.formatter();
        let mirror = &ctx.config.mirror;

        let root = remote_path(self.root.as_deref().unwrap_or(&mirror.root))?;
        let dest = self
            .dest
            .clone()
            .unwrap_or_else(|| PathBuf::from(&mirror.local_base));
        let max_entries = self.max_entries.or(mirror.max_entries);

        let (storage, _session) = crate::auth::connect(&ctx.auth, &ctx.config).await?;
        let usecase = MirrorTreeUseCase::new(storage).with_max_entries(max_entries);

        info!(root = %root, dest = %dest.display(), "Mirroring remote tree");
        let tree = usecase.build_tree(&root).await;
        let report = usecase.materialize(&tree, &dest).await;

        if ctx.format.is_json() {
            formatter.print_json(&report_json(&root.to_string(), &dest, &tree, &report));
            return Ok(());
        }

        if report.is_complete() {
            formatter.success(&format!("Mirrored {} into {}", root, dest.display()));
        } else {
            formatter.warn(&format!(
                "Mirrored {} into {} with {} failure(s)",
                root,
                dest.display(),
                report.failures.len()
            ));
        }
        formatter.info(&format!("Entries listed:  {}", tree.len()));
        formatter.info(&format!("Folders:         {}", report.folders_created));
        formatter.info(&format!("Files:           {}", report.files_written));
        if report.skipped > 0 {
            formatter.info(&format!("Skipped:         {}", report.skipped));
        }
        for (path, err) in &report.failures {
            formatter.error(&format!("{path}: {err}"));
        }

        Ok(())
    }
}

fn report_json(
    root: &str,
    dest: &Path,
    tree: &MirrorTree,
    report: &MaterializeReport,
) -> serde_json::Value {
    let failures: Vec<_> = report
        .failures
        .iter()
        .map(|(path, err)| serde_json::json!({ "path": path.to_string(), "error": err.to_string() }))
        .collect();

    serde_json::json!({
        "success": report.is_complete(),
        "root": root,
        "dest": dest.display().to_string(),
        "entries": tree.len(),
        "folders_created": report.folders_created,
        "files_written": report.files_written,
        "skipped": report.skipped,
        "failures": failures,
    })
}

/// Print the remote folder tree without writing anything locally
#[derive(Debug, Args)]
pub struct TreeCommand {
    /// Remote folder to list (default from config)
    pub root: Option<String>,

    /// Stop listing after this many entries
    #[arg(long)]
    pub max_entries: Option<usize>,
}

impl TreeCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = ctx.formatter();
        let root = remote_path(self.root.as_deref().unwrap_or(&ctx.config.mirror.root))?;
        let max_entries = self.max_entries.or(ctx.config.mirror.max_entries);

        let (storage, _session) = crate::auth::connect(&ctx.auth, &ctx.config).await?;
        let usecase = MirrorTreeUseCase::new(storage).with_max_entries(max_entries);
        let tree = usecase.build_tree(&root).await;

        if ctx.format.is_json() {
            formatter.print_json(&tree_json(&tree));
        } else {
            for line in tree_lines(&tree) {
                formatter.line(&line);
            }
            formatter.info(&format!("{} entries under {}", tree.len(), root));
        }

        Ok(())
    }
}

/// One line per entry in discovery order, folders marked with a slash
fn tree_lines(tree: &MirrorTree) -> Vec<String> {
    tree.iter()
        .map(|(path, entry)| {
            if entry.is_folder() {
                format!("{path}/")
            } else {
                path.to_string()
            }
        })
        .collect()
}

fn tree_json(tree: &MirrorTree) -> serde_json::Value {
    let entries: Vec<_> = tree
        .iter()
        .map(|(path, entry)| {
            serde_json::json!({
                "path": path.to_string(),
                "id": entry.object_id.to_string(),
                "kind": entry.kind.to_string(),
            })
        })
        .collect();
    serde_json::json!({ "entries": entries })
}
