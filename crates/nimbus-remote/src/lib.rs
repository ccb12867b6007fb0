//! Nimbus Remote - HTTP client for the storage service
//!
//! Provides:
//! - A typed async client for the service's REST API
//! - The [`IRemoteStorage`](nimbus_core::ports::IRemoteStorage) adapter used
//!   by the core use cases
//! - Session persistence and email/password login
//!
//! ## Modules
//!
//! - [`client`] - HTTP client, wire types and status mapping
//! - [`provider`] - `IRemoteStorage` implementation over the client
//! - [`session`] - Session file handling and the login flow

pub mod client;
pub mod provider;
pub mod session;

use thiserror::Error;

/// Errors that can occur when communicating with the storage service
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Credentials or session token rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions for the requested operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested node does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The node already exists or the request conflicts with its state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The service is throttling this client
    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// Any other non-success status
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// Returns true for errors caused by rejected credentials
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, RemoteError::Unauthorized(_) | RemoteError::Forbidden(_))
    }
}
