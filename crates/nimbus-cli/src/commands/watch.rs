//! Watch command - Log changes under a local directory
//!
//! Runs the change logger until SIGINT or SIGTERM. No authentication is
//! needed; nothing is sent to the storage service.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use nimbus_core::ports::TracingSink;
use nimbus_watch::logger::ChangeLogger;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::CommandContext;

/// Log every change under a directory until interrupted
#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Directory to watch (default from config)
    pub path: Option<PathBuf>,

    /// Milliseconds between shutdown checks
    #[arg(long)]
    pub tick_ms: Option<u64>,
}

impl WatchCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = ctx.formatter();
        let path = self
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(&ctx.config.watch.path));
        let tick = Duration::from_millis(self.tick_ms.unwrap_or(ctx.config.watch.tick_ms).max(1));

        let logger = ChangeLogger::new(&path, Arc::new(TracingSink)).with_tick(tick);

        let shutdown = CancellationToken::new();
        let signal_token = shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal(signal_token).await;
        });

        formatter.success(&format!("Watching {} (Ctrl+C to stop)", path.display()));
        let state = logger
            .run(shutdown)
            .await
            .with_context(|| format!("Failed to watch {}", path.display()))?;

        info!(path = %path.display(), %state, "Watch finished");
        formatter.success(&format!("Stopped watching {}", path.display()));
        Ok(())
    }
}

/// Waits for SIGINT or SIGTERM, then cancels `token`
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}
