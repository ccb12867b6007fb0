//! Storage service HTTP client
//!
//! Provides a typed HTTP client for the service's REST API. Handles the
//! bearer header, JSON (de)serialization, endpoint construction and the
//! mapping of HTTP statuses onto [`RemoteError`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nimbus_remote::client::NimbusClient;
//!
//! # async fn example() -> Result<(), nimbus_remote::RemoteError> {
//! let client = NimbusClient::for_domain("www.amazon.com", "session-token");
//! let children = client.list_children("/Pictures/").await?;
//! println!("{} entries", children.len());
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use nimbus_core::domain::{EntryKind, ObjectId, RemoteEntry};
use nimbus_core::ports::UploadTarget;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::RemoteError;

// ============================================================================
// Wire types
// ============================================================================

/// A node as returned by the service
#[derive(Debug, Clone, Deserialize)]
pub struct NodeResponse {
    /// Object id
    pub id: String,
    /// Node name
    pub name: String,
    /// Parent path, ending with `/`
    #[serde(default)]
    pub path: String,
    /// `FILE`, `FOLDER` or anything else
    pub kind: EntryKind,
}

impl NodeResponse {
    /// Converts the wire node into a domain [`RemoteEntry`]
    pub fn into_entry(self) -> Result<RemoteEntry, RemoteError> {
        let object_id = ObjectId::new(self.id)
            .map_err(|e| RemoteError::InvalidResponse(format!("bad node id: {e}")))?;
        Ok(RemoteEntry::new(self.path, self.name, object_id, self.kind))
    }
}

/// Response of `GET /nodes/children`
#[derive(Debug, Deserialize)]
struct ChildrenResponse {
    #[serde(default)]
    nodes: Vec<NodeResponse>,
}

/// Response of `POST /auth/login`
#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// Account details returned by `GET /account`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub email: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateNodeRequest<'a> {
    parent_path: &'a str,
    name: &'a str,
    kind: EntryKind,
}

#[derive(Debug, Serialize)]
struct UploadTargetRequest {
    size: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompleteUploadRequest<'a> {
    storage_key: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveRequest<'a> {
    destination_parent_id: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct RecycleRequest<'a> {
    ids: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

// ============================================================================
// Status mapping
// ============================================================================

/// Maps a non-success status and its body onto a [`RemoteError`]
pub fn status_error(status: StatusCode, body: &str) -> RemoteError {
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no reason given")
            .to_string()
    } else {
        body.trim().to_string()
    };

    match status {
        StatusCode::UNAUTHORIZED => RemoteError::Unauthorized(message),
        StatusCode::FORBIDDEN => RemoteError::Forbidden(message),
        StatusCode::NOT_FOUND => RemoteError::NotFound(message),
        StatusCode::CONFLICT => RemoteError::Conflict(message),
        StatusCode::TOO_MANY_REQUESTS => RemoteError::TooManyRequests(message),
        s if s.is_server_error() => RemoteError::ServerError(message),
        s => RemoteError::Api {
            status: s.as_u16(),
            message,
        },
    }
}

async fn check(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}

// ============================================================================
// NimbusClient
// ============================================================================

/// HTTP client for the storage service
///
/// Wraps `reqwest::Client` with the bearer header and base URL construction.
/// Every method issues exactly one request; nothing is retried.
pub struct NimbusClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests, without a trailing slash
    base_url: String,
    /// Session token; empty before login
    token: String,
}

impl NimbusClient {
    /// Creates a client for the given API base URL
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. `https://www.amazon.com/api/v1`
    /// * `token` - Session token (may be empty before login)
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Creates a client for `https://{domain}/api/v1`
    pub fn for_domain(domain: &str, token: impl Into<String>) -> Self {
        Self::new(format!("https://{domain}/api/v1"), token)
    }

    /// Replaces the HTTP client with one that enforces a per-request timeout
    ///
    /// # Errors
    /// Returns [`RemoteError::Network`] if the TLS backend cannot be initialised
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, RemoteError> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Updates the session token (e.g. after a login)
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
        debug!("Updated NimbusClient session token");
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates an authenticated request builder for the given method and path
    ///
    /// Prepends the base URL and adds the bearer header when a token is set.
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - API path relative to the base URL (e.g. "/nodes/info")
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, &url);
        if self.token.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.token)
        }
    }

    /// Resolves an upload endpoint; relative endpoints hang off the base URL
    fn resolve_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = check(builder.send().await?).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), RemoteError> {
        check(builder.send().await?).await?;
        Ok(())
    }

    // ========================================================================
    // Metadata and listing
    // ========================================================================

    /// Fetches the node at `path` via `GET /nodes/info`
    pub async fn get_info(&self, path: &str) -> Result<RemoteEntry, RemoteError> {
        debug!(path, "Fetching node info");
        let node: NodeResponse = self
            .send_json(
                self.request(Method::GET, "/nodes/info")
                    .query(&[("path", path)]),
            )
            .await?;
        node.into_entry()
    }

    /// Lists the direct children of the container `path`
    pub async fn list_children(&self, path: &str) -> Result<Vec<RemoteEntry>, RemoteError> {
        debug!(path, "Listing children");
        let children: ChildrenResponse = self
            .send_json(
                self.request(Method::GET, "/nodes/children")
                    .query(&[("path", path)]),
            )
            .await?;
        let entries = children
            .nodes
            .into_iter()
            .filter_map(|node| {
                let name = node.name.clone();
                match node.into_entry() {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!(path, name = %name, error = %e, "Skipping malformed node");
                        None
                    }
                }
            })
            .collect();
        Ok(entries)
    }

    /// Creates a node named `name` of `kind` under `parent_path`
    pub async fn create_node(
        &self,
        parent_path: &str,
        name: &str,
        kind: EntryKind,
    ) -> Result<RemoteEntry, RemoteError> {
        debug!(parent = parent_path, name, %kind, "Creating node");
        let node: NodeResponse = self
            .send_json(self.request(Method::POST, "/nodes").json(&CreateNodeRequest {
                parent_path,
                name,
                kind,
            }))
            .await?;
        node.into_entry()
    }

    // ========================================================================
    // Transfers
    // ========================================================================

    /// Requests an upload target for `size` bytes of content
    pub async fn upload_target(
        &self,
        id: &ObjectId,
        size: u64,
    ) -> Result<UploadTarget, RemoteError> {
        let path = format!("/nodes/{}/upload-target", id.as_str());
        debug!(id = %id, size, "Requesting upload target");
        self.send_json(
            self.request(Method::POST, &path)
                .json(&UploadTargetRequest { size }),
        )
        .await
    }

    /// Posts `data` to an upload endpoint as a multipart form
    ///
    /// Every parameter becomes a text field; the content goes last in a
    /// `file` part carrying `name` as its file name.
    pub async fn upload_multipart(
        &self,
        endpoint: &str,
        parameters: &BTreeMap<String, String>,
        name: &str,
        data: Vec<u8>,
    ) -> Result<(), RemoteError> {
        let url = self.resolve_url(endpoint);
        debug!(url = %url, name, size = data.len(), "Uploading content");

        let mut form = Form::new();
        for (key, value) in parameters {
            form = form.text(key.clone(), value.clone());
        }
        form = form.part("file", Part::bytes(data).file_name(name.to_string()));

        self.send_empty(self.client.post(&url).multipart(form)).await
    }

    /// Marks the upload identified by `storage_key` as complete
    pub async fn complete_upload(
        &self,
        id: &ObjectId,
        storage_key: &str,
    ) -> Result<(), RemoteError> {
        let path = format!("/nodes/{}/upload-complete", id.as_str());
        debug!(id = %id, "Completing upload");
        self.send_empty(
            self.request(Method::POST, &path)
                .json(&CompleteUploadRequest { storage_key }),
        )
        .await
    }

    /// Downloads the content of a file node
    pub async fn download(&self, id: &ObjectId) -> Result<Vec<u8>, RemoteError> {
        let path = format!("/nodes/{}/content", id.as_str());
        debug!(id = %id, "Downloading content");
        let response = check(self.request(Method::GET, &path).send().await?).await?;
        let bytes = response.bytes().await?;
        debug!(id = %id, bytes = bytes.len(), "Downloaded content");
        Ok(bytes.to_vec())
    }

    // ========================================================================
    // Move and recycle
    // ========================================================================

    /// Moves a node under a new parent, with the given name
    pub async fn move_node(
        &self,
        id: &ObjectId,
        destination_parent_id: &ObjectId,
        name: &str,
    ) -> Result<(), RemoteError> {
        let path = format!("/nodes/{}/move", id.as_str());
        debug!(id = %id, dest = %destination_parent_id, name, "Moving node");
        self.send_empty(self.request(Method::POST, &path).json(&MoveRequest {
            destination_parent_id: destination_parent_id.as_str(),
            name,
        }))
        .await
    }

    /// Moves nodes to the recycle bin
    pub async fn recycle(&self, ids: &[ObjectId]) -> Result<(), RemoteError> {
        debug!(count = ids.len(), "Recycling nodes");
        self.send_empty(self.request(Method::POST, "/recycle").json(&RecycleRequest {
            ids: ids.iter().map(|i| i.as_str()).collect(),
        }))
        .await
    }

    // ========================================================================
    // Account
    // ========================================================================

    /// Exchanges email and password for a session token
    pub async fn login(&self, email: &str, password: &str) -> Result<String, RemoteError> {
        debug!(email, "Logging in");
        let response: LoginResponse = self
            .send_json(
                self.request(Method::POST, "/auth/login")
                    .json(&LoginRequest { email, password }),
            )
            .await?;
        if response.token.is_empty() {
            return Err(RemoteError::InvalidResponse(
                "login returned an empty token".to_string(),
            ));
        }
        Ok(response.token)
    }

    /// Fetches the account behind the current token
    pub async fn get_account(&self) -> Result<AccountInfo, RemoteError> {
        debug!("Fetching account");
        self.send_json(self.request(Method::GET, "/account")).await
    }
}
