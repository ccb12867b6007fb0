//! Authentication gate shared by every remote command
//!
//! Resolves the operator's credentials (prompting for a password when only
//! an email was given), builds the HTTP client for the configured service,
//! and establishes a session before any remote operation runs.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use console::Term;
use nimbus_core::config::Config;
use nimbus_remote::client::NimbusClient;
use nimbus_remote::provider::HttpRemoteStorage;
use nimbus_remote::session::{create_session, Credentials, Session};
use tracing::{debug, info};

use crate::commands::AuthArgs;

/// Collects credentials from the flags, prompting for a missing password
///
/// The prompt only appears when `--email` is given without `--password`.
pub fn resolve_credentials(args: &AuthArgs) -> Result<Credentials> {
    let password = match (&args.email, &args.password) {
        (Some(email), None) => Some(prompt_password(email)?),
        _ => args.password.clone(),
    };

    Ok(Credentials {
        email: args.email.clone(),
        password,
        session_file: args.session.clone(),
    })
}

/// Reads a password from the terminal without echoing it
fn prompt_password(email: &str) -> Result<String> {
    let term = Term::stderr();
    term.write_str(&format!("Password for {email}: "))
        .context("Failed to write password prompt")?;
    term.read_secure_line().context("Failed to read password")
}

/// Service domain: the flag wins over the configuration
pub fn domain(args: &AuthArgs, config: &Config) -> String {
    args.domain
        .clone()
        .unwrap_or_else(|| config.remote.domain.clone())
}

/// Builds an unauthenticated client for the configured service
pub fn build_client(args: &AuthArgs, config: &Config) -> Result<NimbusClient> {
    let client = match &args.domain {
        Some(domain) => NimbusClient::for_domain(domain, ""),
        None => NimbusClient::new(config.remote.api_base_url(), ""),
    };
    debug!(base_url = client.base_url(), "Built service client");
    client
        .with_timeout(Duration::from_secs(config.remote.timeout_secs))
        .context("Failed to initialise HTTP client")
}

/// Authenticates and returns storage bound to the new session
///
/// # Errors
/// Missing credentials are reported before any request is sent; every
/// authentication failure is fatal.
pub async fn connect(args: &AuthArgs, config: &Config) -> Result<(Arc<HttpRemoteStorage>, Session)> {
    let credentials = resolve_credentials(args)?;
    credentials.check()?;

    let domain = domain(args, config);
    let mut client = build_client(args, config)?;
    let session = create_session(&mut client, &domain, &credentials, &config.session.file)
        .await
        .context("Authentication failed")?;

    info!(domain = %session.domain, email = ?session.email, "Authenticated");
    Ok((Arc::new(HttpRemoteStorage::new(client)), session))
}
