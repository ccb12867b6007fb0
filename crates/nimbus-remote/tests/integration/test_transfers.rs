//! Integration tests for create, upload, download, move and recycle

use std::collections::BTreeMap;
use std::sync::Arc;

use nimbus_core::domain::{EntryKind, ObjectId, RemotePath};
use nimbus_core::usecases::RemoteOperations;
use nimbus_remote::provider::HttpRemoteStorage;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{self, node};

fn id(s: &str) -> ObjectId {
    ObjectId::new(s.to_string()).unwrap()
}

// ============================================================================
// Client-level requests
// ============================================================================

#[tokio::test]
async fn test_create_node_posts_camel_case_body() {
    let (server, client) = common::setup().await;

    Mock::given(method("POST"))
        .and(path("/nodes"))
        .and(body_json(json!({"parentPath": "/a/", "name": "new", "kind": "FOLDER"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(node("n-9", "/a/", "new", "FOLDER")))
        .expect(1)
        .mount(&server)
        .await;

    let created = client
        .create_node("/a/", "new", EntryKind::Folder)
        .await
        .expect("create failed");
    assert_eq!(created.object_id.as_str(), "n-9");
    assert!(created.is_folder());
}

#[tokio::test]
async fn test_upload_target_and_multipart() {
    let (server, client) = common::setup().await;

    Mock::given(method("POST"))
        .and(path("/nodes/n-1/upload-target"))
        .and(body_json(json!({"size": 11})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "endpoint": format!("{}/blob-upload", server.uri()),
            "parameters": {"policy": "p-123", "signature": "s-456"},
            "storageKey": "blob-key-1"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/blob-upload"))
        .and(body_string_contains("p-123"))
        .and(body_string_contains("s-456"))
        .and(body_string_contains("filename=\"hello.txt\""))
        .and(body_string_contains("hello world"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let target = client.upload_target(&id("n-1"), 11).await.expect("target failed");
    assert_eq!(target.storage_key, "blob-key-1");
    assert_eq!(target.parameters.len(), 2);

    client
        .upload_multipart(&target.endpoint, &target.parameters, "hello.txt", b"hello world".to_vec())
        .await
        .expect("multipart upload failed");
}

#[tokio::test]
async fn test_complete_upload() {
    let (server, client) = common::setup().await;

    Mock::given(method("POST"))
        .and(path("/nodes/n-1/upload-complete"))
        .and(body_json(json!({"storageKey": "blob-key-1"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .complete_upload(&id("n-1"), "blob-key-1")
        .await
        .expect("complete failed");
}

#[tokio::test]
async fn test_download_returns_content() {
    let (server, client) = common::setup().await;

    let content: Vec<u8> = (0..65_536).map(|i| (i % 256) as u8).collect();
    common::mount_download(&server, "n-7", &content).await;

    let data = client.download(&id("n-7")).await.expect("download failed");
    assert_eq!(data, content);
}

#[tokio::test]
async fn test_download_empty_file() {
    let (server, client) = common::setup().await;
    common::mount_download(&server, "empty", &[]).await;

    assert!(client.download(&id("empty")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_move_and_recycle() {
    let (server, client) = common::setup().await;

    Mock::given(method("POST"))
        .and(path("/nodes/n-1/move"))
        .and(body_json(json!({"destinationParentId": "n-2", "name": "renamed.txt"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/recycle"))
        .and(body_json(json!({"ids": ["n-1", "n-3"]})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .move_node(&id("n-1"), &id("n-2"), "renamed.txt")
        .await
        .expect("move failed");
    client
        .recycle(&[id("n-1"), id("n-3")])
        .await
        .expect("recycle failed");
}

#[tokio::test]
async fn test_relative_upload_endpoint_uses_base_url() {
    let (server, client) = common::setup().await;

    Mock::given(method("POST"))
        .and(path("/uploads/direct"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .upload_multipart("/uploads/direct", &BTreeMap::new(), "a.bin", vec![1, 2, 3])
        .await
        .expect("upload to relative endpoint failed");
}

// ============================================================================
// RemoteOperations over HTTP
// ============================================================================

#[tokio::test]
async fn test_create_file_request_order() {
    let (server, client) = common::setup().await;

    common::mount_info(&server, "/docs", node("dir-1", "/", "docs", "FOLDER")).await;

    Mock::given(method("POST"))
        .and(path("/nodes"))
        .and(body_json(json!({"parentPath": "/docs/", "name": "report.txt", "kind": "FILE"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(node("f-1", "/docs/", "report.txt", "FILE")))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/nodes/f-1/upload-target"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "endpoint": format!("{}/blob", server.uri()),
            "parameters": {"policy": "pol"},
            "storageKey": "key-f-1"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/blob"))
        .and(body_string_contains("quarterly numbers"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/nodes/f-1/upload-complete"))
        .and(body_json(json!({"storageKey": "key-f-1"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("report.txt");
    std::fs::write(&local, "quarterly numbers").unwrap();

    let ops = RemoteOperations::new(Arc::new(HttpRemoteStorage::new(client)));
    let created = ops
        .create_file(&RemotePath::parse("/docs").unwrap(), &local)
        .await
        .expect("create_file failed");
    assert_eq!(created.object_id.as_str(), "f-1");

    assert_eq!(
        common::request_paths(&server).await,
        vec![
            "GET /nodes/info",
            "POST /nodes",
            "POST /nodes/f-1/upload-target",
            "POST /blob",
            "POST /nodes/f-1/upload-complete",
        ]
    );
}

#[tokio::test]
async fn test_get_file_on_missing_path_is_not_found() {
    let (server, client) = common::setup().await;
    common::mount_info_missing(&server, "/nope.txt").await;

    let ops = RemoteOperations::new(Arc::new(HttpRemoteStorage::new(client)));
    let err = ops
        .get_file(&RemotePath::parse("/nope.txt").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, nimbus_core::domain::OperationError::NotFound(_)));
}
