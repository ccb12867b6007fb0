//! Login command - Authenticate and persist the session
//!
//! Runs the same session flow every remote command runs, then reports the
//! account and where the session was saved. Authentication failures are
//! returned as errors so the process exits non-zero.

use anyhow::Result;
use clap::Args;

use super::CommandContext;

/// Authenticate and save the session for later commands
#[derive(Debug, Args)]
pub struct LoginCommand {}

impl LoginCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = ctx.formatter();
        let (_storage, session) = crate::auth::connect(&ctx.auth, &ctx.config).await?;

        let saved_to = ctx
            .auth
            .session
            .clone()
            .unwrap_or_else(|| ctx.config.session.file.clone());

        if ctx.format.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "domain": session.domain,
                "email": session.email,
                "session_file": saved_to.display().to_string(),
            }));
        } else {
            formatter.success(&format!(
                "Logged in to {} as {}",
                session.domain,
                session.email.as_deref().unwrap_or("(saved session)")
            ));
            formatter.info(&format!("Session saved to {}", saved_to.display()));
        }
        Ok(())
    }
}
