//! Shared test helpers for the storage service integration tests
//!
//! Each helper mounts wiremock endpoints shaped like the service's REST API.

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nimbus_remote::client::NimbusClient;

pub const TOKEN: &str = "test-session-token";

/// Starts a mock server and returns it with a client pointing at it
pub async fn setup() -> (MockServer, NimbusClient) {
    let server = MockServer::start().await;
    let client = NimbusClient::new(server.uri(), TOKEN);
    (server, client)
}

/// Builds a wire node
pub fn node(id: &str, parent: &str, name: &str, kind: &str) -> Value {
    json!({ "id": id, "name": name, "path": parent, "kind": kind })
}

/// Mounts `GET /nodes/info?path={p}`
pub async fn mount_info(server: &MockServer, remote_path: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/nodes/info"))
        .and(query_param("path", remote_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mounts `GET /nodes/info?path={p}` answering 404
pub async fn mount_info_missing(server: &MockServer, remote_path: &str) {
    Mock::given(method("GET"))
        .and(path("/nodes/info"))
        .and(query_param("path", remote_path))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such node"))
        .mount(server)
        .await;
}

/// Mounts `GET /nodes/children?path={p}`
pub async fn mount_children(server: &MockServer, container: &str, nodes: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/nodes/children"))
        .and(query_param("path", container))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "nodes": nodes })))
        .mount(server)
        .await;
}

/// Mounts `GET /nodes/{id}/content`
pub async fn mount_download(server: &MockServer, id: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/nodes/{id}/content")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(content.to_vec())
                .append_header("Content-Type", "application/octet-stream"),
        )
        .mount(server)
        .await;
}

/// Paths of every request the server received, in order
pub async fn request_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect()
}
