//! Session persistence and login
//!
//! A [`Session`] is the opaque token the service hands out after an
//! email/password login, together with the domain it belongs to. It is
//! stored as JSON in a session file so later invocations can skip the
//! password.
//!
//! ## Components
//!
//! - [`Session`] - The persisted session and its file I/O
//! - [`Credentials`] - What the operator supplied on the command line
//! - [`create_session`] - Load, log in or validate, then persist

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client::NimbusClient;
use crate::RemoteError;

// ============================================================================
// AuthError
// ============================================================================

/// Fatal authentication and configuration errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Neither email and password nor a session file were supplied
    #[error("No credentials: supply --email and --password, or --session <file>")]
    MissingCredentials,

    /// A session file was named but could not be used, and no password was given
    #[error("Session file {0} could not be loaded and no password was given")]
    NoUsableSession(PathBuf),

    /// The service rejected the email/password login
    #[error("Login failed: {0}")]
    LoginFailed(RemoteError),

    /// The loaded session was rejected by the service
    #[error("Session is no longer valid: {0}")]
    InvalidSession(RemoteError),

    /// The session could not be written to disk
    #[error("Failed to save session to {path}: {message}")]
    Persist {
        /// Target session file
        path: PathBuf,
        /// Underlying I/O failure
        message: String,
    },
}

// ============================================================================
// Session
// ============================================================================

/// An authenticated session with the storage service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Service domain the token was issued by
    pub domain: String,
    /// Account email, when known
    #[serde(default)]
    pub email: Option<String>,
    /// Opaque session token
    pub token: String,
    /// When the session was created
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session stamped with the current time
    pub fn new(domain: impl Into<String>, email: Option<String>, token: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            email,
            token: token.into(),
            created_at: Utc::now(),
        }
    }

    /// Writes the session as JSON to `path`, creating parent directories
    ///
    /// On Unix the file is restricted to the owner.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize session")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write session file {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to restrict {}", path.display()))?;
        }

        debug!(path = %path.display(), "Saved session");
        Ok(())
    }

    /// Reads a session previously written by [`Session::save_to_file`]
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session file {}", path.display()))?;
        let session: Session =
            serde_json::from_str(&json).context("Failed to parse session file")?;
        debug!(path = %path.display(), domain = %session.domain, "Loaded session");
        Ok(session)
    }
}

// ============================================================================
// Credentials and the session flow
// ============================================================================

/// Authentication inputs supplied by the operator
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
    pub session_file: Option<PathBuf>,
}

impl Credentials {
    /// Returns true when email and password are both present
    pub fn has_password_login(&self) -> bool {
        self.email.is_some() && self.password.is_some()
    }

    /// Checks that some way to authenticate was supplied
    ///
    /// # Errors
    /// [`AuthError::MissingCredentials`] when there is neither a full
    /// email/password pair nor a session file
    pub fn check(&self) -> Result<(), AuthError> {
        if self.has_password_login() || self.session_file.is_some() {
            Ok(())
        } else {
            Err(AuthError::MissingCredentials)
        }
    }
}

/// Establishes an authenticated session and persists it
///
/// 1. Loads the session file when one is given; a load failure is logged
///    and the flow continues without it.
/// 2. Logs in with email and password when both are present.
/// 3. Otherwise validates the loaded session against the service.
/// 4. Saves the session to the given file, or to `default_file`.
///
/// On success `client` carries the session token.
///
/// # Errors
/// Any [`AuthError`]; all of them are fatal to the caller. Missing
/// credentials are reported before any request is sent.
pub async fn create_session(
    client: &mut NimbusClient,
    domain: &str,
    credentials: &Credentials,
    default_file: &Path,
) -> Result<Session, AuthError> {
    credentials.check()?;

    let loaded = match &credentials.session_file {
        Some(file) => match Session::load_from_file(file) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(path = %file.display(), error = %format!("{e:#}"), "Could not load session, starting fresh");
                None
            }
        },
        None => None,
    };

    let session = match (&credentials.email, &credentials.password) {
        (Some(email), Some(password)) => {
            info!(email = %email, domain, "Logging in");
            let token = client
                .login(email, password)
                .await
                .map_err(AuthError::LoginFailed)?;
            Session::new(domain, Some(email.clone()), token)
        }
        _ => {
            let session = match loaded {
                Some(session) => session,
                None => {
                    let file = credentials.session_file.clone().unwrap_or_default();
                    return Err(AuthError::NoUsableSession(file));
                }
            };
            if session.domain != domain {
                warn!(
                    session_domain = %session.domain,
                    domain,
                    "Session was issued for a different domain"
                );
            }
            client.set_token(session.token.clone());
            let account = client
                .get_account()
                .await
                .map_err(AuthError::InvalidSession)?;
            debug!(email = ?account.email, "Session validated");
            session
        }
    };

    client.set_token(session.token.clone());

    let target = credentials.session_file.as_deref().unwrap_or(default_file);
    session
        .save_to_file(target)
        .map_err(|e| AuthError::Persist {
            path: target.to_path_buf(),
            message: format!("{e:#}"),
        })?;
    info!(path = %target.display(), "Session established");

    Ok(session)
}
